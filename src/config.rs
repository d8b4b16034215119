use anyhow::{Context, Result, bail};

use crate::heightfield::GridSize;

pub const SEED_ENV_VAR: &str = "TERRAIN_SEED";

const USAGE: &str = "usage: terrain-viewer <x_size> <z_size> [seed]";

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub grid: GridSize,
    pub seed: Option<u64>,
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,
}

impl ViewerConfig {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            seed: None,
            window_width: 600,
            window_height: 600,
            title: "Terrain".to_string(),
        }
    }

    /// Parses the arguments after the program name. A seed given on the command
    /// line wins over `env_seed`.
    pub fn from_args<I, S>(args: I, env_seed: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let (x, z, seed) = match args.as_slice() {
            [x, z] => (x, z, None),
            [x, z, seed] => (x, z, Some(seed.as_ref())),
            _ => bail!("expected 2 or 3 arguments, got {}\n{USAGE}", args.len()),
        };

        let x_size = parse_dimension("x_size", x.as_ref())?;
        let z_size = parse_dimension("z_size", z.as_ref())?;
        let grid = GridSize::new(x_size, z_size)?;

        let seed = match seed.or(env_seed) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid seed {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            seed,
            ..Self::new(grid)
        })
    }

    pub fn from_env() -> Result<Self> {
        let env_seed = std::env::var(SEED_ENV_VAR).ok();
        Self::from_args(std::env::args().skip(1), env_seed.as_deref())
    }
}

fn parse_dimension(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .with_context(|| format!("{name} must be a positive integer, got {raw:?}\n{USAGE}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions_and_seed() {
        let config = ViewerConfig::from_args(["100", "60", "42"], None).unwrap();
        assert_eq!(config.grid, GridSize::new(100, 60).unwrap());
        assert_eq!(config.seed, Some(42));
        assert_eq!((config.window_width, config.window_height), (600, 600));
    }

    #[test]
    fn seed_falls_back_to_environment() {
        let config = ViewerConfig::from_args(["10", "10"], Some("7")).unwrap();
        assert_eq!(config.seed, Some(7));
        let config = ViewerConfig::from_args(["10", "10", "3"], Some("7")).unwrap();
        assert_eq!(config.seed, Some(3));
        let config = ViewerConfig::from_args(["10", "10"], None).unwrap();
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(ViewerConfig::from_args(["10"], None).is_err());
        assert!(ViewerConfig::from_args(["10", "10", "1", "2"], None).is_err());
        assert!(ViewerConfig::from_args(["ten", "10"], None).is_err());
        assert!(ViewerConfig::from_args(["-4", "10"], None).is_err());
        assert!(ViewerConfig::from_args(["0", "10"], None).is_err());
        assert!(ViewerConfig::from_args(["10", "10", "x"], None).is_err());
    }

    #[test]
    fn error_names_the_argument() {
        let err = ViewerConfig::from_args(["10", "deep"], None).unwrap_err();
        assert!(format!("{err:#}").contains("z_size"));
    }
}
