//! Presentation state the renderer reads each frame, plus the height-to-colour
//! mapping and light rig it shades the terrain with.

use glam::Vec3;

use crate::heightfield::GridSize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Filled,
    Wire,
    /// Filled surface with the wireframe drawn over it.
    Doubled,
}

impl RenderMode {
    pub fn next(self) -> Self {
        match self {
            RenderMode::Filled => RenderMode::Wire,
            RenderMode::Wire => RenderMode::Doubled,
            RenderMode::Doubled => RenderMode::Filled,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Filled => "Filled Rendering",
            RenderMode::Wire => "Wire Rendering",
            RenderMode::Doubled => "Doubled Rendering",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshMode {
    #[default]
    Quads,
    Triangles,
}

impl MeshMode {
    pub fn toggled(self) -> Self {
        match self {
            MeshMode::Quads => MeshMode::Triangles,
            MeshMode::Triangles => MeshMode::Quads,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshMode::Quads => "Quads Mode",
            MeshMode::Triangles => "Triangle Mode",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySettings {
    pub render_mode: RenderMode,
    pub mesh_mode: MeshMode,
    pub smooth_shading: bool,
    pub lighting: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            mesh_mode: MeshMode::default(),
            smooth_shading: true,
            lighting: true,
        }
    }
}

impl DisplaySettings {
    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.next();
    }

    pub fn toggle_mesh_mode(&mut self) {
        self.mesh_mode = self.mesh_mode.toggled();
    }

    pub fn toggle_shading(&mut self) {
        self.smooth_shading = !self.smooth_shading;
    }

    pub fn toggle_lighting(&mut self) {
        self.lighting = !self.lighting;
    }

    pub fn draws_fill(&self) -> bool {
        self.render_mode != RenderMode::Wire
    }

    pub fn draws_wire(&self) -> bool {
        self.render_mode != RenderMode::Filled
    }

    /// Only the overlay over a filled surface is drawn in [`WIRE_COLOR`]; a bare
    /// wireframe keeps the topographic vertex colours.
    pub fn wire_uses_overlay_color(&self) -> bool {
        self.render_mode == RenderMode::Doubled
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = vec![self.render_mode.label()];
        if self.smooth_shading {
            labels.push("Gouraud shading");
        }
        if self.lighting {
            labels.push("Lighting enabled");
        }
        labels.push(self.mesh_mode.label());
        labels
    }
}

pub const AMBIENT_FACTOR: f32 = 0.3;
pub const DIFFUSE_FACTOR: f32 = 0.6;
pub const SPECULAR_FACTOR: f32 = 1.0;
pub const SHININESS: f32 = 100.0;

/// Colour used for the wireframe overlay.
pub const WIRE_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Green at sea level fading to red at half of `max_height` and above.
pub fn topographic_color(height: f32, max_height: f32) -> [f32; 3] {
    let ratio = if max_height > 0.0 { height / max_height } else { 0.0 };
    let green = (1.0 - 2.0 * ratio).max(0.0);
    [1.0 - green, green, 0.0]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub linear_attenuation: f32,
}

/// The two point lights hung over opposite corners of the grid.
pub fn terrain_lights(size: GridSize) -> [Light; 2] {
    let height = size.extent() / 80.0 + 10.0;
    [
        Light {
            position: Vec3::new(0.0, height, 0.0),
            ambient: Vec3::splat(0.3),
            diffuse: Vec3::splat(0.7),
            specular: Vec3::splat(1.0),
            linear_attenuation: 0.02,
        },
        Light {
            position: Vec3::new(size.x_size() as f32, height, size.z_size() as f32),
            ambient: Vec3::splat(0.3),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::splat(0.7),
            linear_attenuation: 0.02,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mode_cycles_through_three_states() {
        let mut settings = DisplaySettings::default();
        assert!(settings.draws_fill() && !settings.draws_wire());
        settings.cycle_render_mode();
        assert_eq!(settings.render_mode, RenderMode::Wire);
        assert!(!settings.draws_fill() && settings.draws_wire());
        assert!(!settings.wire_uses_overlay_color());
        settings.cycle_render_mode();
        assert!(settings.draws_fill() && settings.draws_wire());
        assert!(settings.wire_uses_overlay_color());
        settings.cycle_render_mode();
        assert_eq!(settings.render_mode, RenderMode::Filled);
    }

    #[test]
    fn labels_follow_toggles() {
        let mut settings = DisplaySettings::default();
        assert_eq!(
            settings.labels(),
            ["Filled Rendering", "Gouraud shading", "Lighting enabled", "Quads Mode"]
        );
        settings.toggle_shading();
        settings.toggle_lighting();
        settings.toggle_mesh_mode();
        assert_eq!(settings.labels(), ["Filled Rendering", "Triangle Mode"]);
    }

    #[test]
    fn topographic_ramp() {
        assert_eq!(topographic_color(0.0, 10.0), [0.0, 1.0, 0.0]);
        assert_eq!(topographic_color(2.5, 10.0), [0.5, 0.5, 0.0]);
        assert_eq!(topographic_color(5.0, 10.0), [1.0, 0.0, 0.0]);
        assert_eq!(topographic_color(9.0, 10.0), [1.0, 0.0, 0.0]);
        assert_eq!(topographic_color(1.0, 0.0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn lights_sit_over_opposite_corners() {
        let [near, far] = terrain_lights(GridSize::new(100, 60).unwrap());
        assert_eq!(near.position, Vec3::new(0.0, 12.0, 0.0));
        assert_eq!(far.position, Vec3::new(100.0, 12.0, 60.0));
    }
}
