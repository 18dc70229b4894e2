use anyhow::{Context, Result, bail};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path, str::FromStr, str::SplitWhitespace};

/// Population layout mode.
///
/// The layout fixes both the placement strategy and the comparison operator
/// of the exposure threshold: strict `<` for `Scattered`, `<=` for the two
/// grid modes. The asymmetry is deliberate and must not be unified.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Layout {
    /// N agents at uniformly random positions within the field.
    Scattered { n_agents: usize },
    /// One agent per cell of an R×C grid spaced by the exposure distance.
    Grid { rows: usize, columns: usize },
    /// N ≤ R×C agents at distinct random cells, leaving some cells empty.
    RandomGrid {
        rows: usize,
        columns: usize,
        n_agents: usize,
    },
}

impl Layout {
    /// Total number of agents this layout creates.
    pub fn population(&self) -> usize {
        match *self {
            Layout::Scattered { n_agents } => n_agents,
            Layout::Grid { rows, columns } => rows * columns,
            Layout::RandomGrid { n_agents, .. } => n_agents,
        }
    }

    /// Whether the exposure threshold is compared with `<=` instead of `<`.
    pub fn inclusive_exposure(&self) -> bool {
        !matches!(self, Layout::Scattered { .. })
    }
}

/// Simulation configuration parameters.
///
/// Loaded from a line-oriented, keyword-prefixed text file and validated
/// before use. See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone)]
pub struct Config {
    /// Field width.
    pub width: f64,
    /// Field height.
    pub height: f64,

    /// Spatial threshold of the neighbor relation.
    pub exposure_distance: f64,

    /// Days an exposed agent incubates before falling sick.
    pub incubation_days: f64,
    /// Days a sick agent stays contagious before resolving.
    pub sickness_days: f64,
    /// Probability that a sick agent recovers instead of dying.
    pub recover: f64,

    pub layout: Layout,

    /// Number of agents seeded sick at the start.
    pub initial_sick: usize,
    /// Number of agents seeded immune at the start.
    pub initial_immune: usize,

    /// Wall-clock length of one simulated day.
    pub seconds_per_day: f64,

    /// Optional RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 200.0,
            exposure_distance: 20.0,
            incubation_days: 5.0,
            sickness_days: 10.0,
            recover: 0.95,
            layout: Layout::Scattered { n_agents: 100 },
            initial_sick: 1,
            initial_immune: 0,
            seconds_per_day: 1.0,
            seed: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a keyword's value is
    /// malformed or missing, or the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let text = fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::parse(&text).with_context(|| format!("failed to parse {file:?}"))
    }

    /// Parse a [`Config`] from the line-oriented text format.
    ///
    /// Each line starts with a keyword followed by whitespace-separated
    /// values; unknown keywords are ignored and missing keywords keep their
    /// defaults. When several layout keywords appear the last one wins.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cfg = Config::default();

        for line in text.lines() {
            let mut words = line.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };
            match keyword {
                "dimensions" => {
                    cfg.width = parse_value(&mut words, keyword)?;
                    cfg.height = parse_value(&mut words, keyword)?;
                }
                "exposuredistance" => {
                    cfg.exposure_distance = parse_value(&mut words, keyword)?;
                }
                "incubation" => {
                    cfg.incubation_days = parse_value(&mut words, keyword)?;
                }
                "sickness" => {
                    cfg.sickness_days = parse_value(&mut words, keyword)?;
                }
                "recover" => {
                    cfg.recover = parse_value(&mut words, keyword)?;
                }
                "random" => {
                    cfg.layout = Layout::Scattered {
                        n_agents: parse_value(&mut words, keyword)?,
                    };
                }
                "grid" => {
                    cfg.layout = Layout::Grid {
                        rows: parse_value(&mut words, keyword)?,
                        columns: parse_value(&mut words, keyword)?,
                    };
                }
                "randomgrid" => {
                    cfg.layout = Layout::RandomGrid {
                        rows: parse_value(&mut words, keyword)?,
                        columns: parse_value(&mut words, keyword)?,
                        n_agents: parse_value(&mut words, keyword)?,
                    };
                }
                "initialsick" => {
                    cfg.initial_sick = parse_value(&mut words, keyword)?;
                }
                "initialimmune" => {
                    cfg.initial_immune = parse_value(&mut words, keyword)?;
                }
                "secondsperday" => {
                    cfg.seconds_per_day = parse_value(&mut words, keyword)?;
                }
                "seed" => {
                    cfg.seed = Some(parse_value(&mut words, keyword)?);
                }
                _ => {}
            }
        }

        cfg.validate().context("failed to validate config")?;

        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.width, 10.0..100_000.0).context("invalid field width")?;
        check_num(self.height, 10.0..100_000.0).context("invalid field height")?;

        check_num(self.exposure_distance, 0.0..10_000.0).context("invalid exposure distance")?;
        check_num(self.incubation_days, 0.0..10_000.0).context("invalid incubation time")?;
        check_num(self.sickness_days, 0.0..10_000.0).context("invalid sickness time")?;
        check_num(self.recover, 0.0..=1.0).context("invalid recovery probability")?;
        check_num(self.seconds_per_day, 0.001..86_400.0).context("invalid seconds per day")?;

        match self.layout {
            Layout::Scattered { n_agents } => {
                check_num(n_agents, 1..100_000).context("invalid number of agents")?;
            }
            Layout::Grid { rows, columns } => {
                check_num(rows, 1..1_000).context("invalid number of rows")?;
                check_num(columns, 1..1_000).context("invalid number of columns")?;
            }
            Layout::RandomGrid {
                rows,
                columns,
                n_agents,
            } => {
                check_num(rows, 1..1_000).context("invalid number of rows")?;
                check_num(columns, 1..1_000).context("invalid number of columns")?;
                check_num(n_agents, 1..=rows * columns).context("invalid number of agents")?;
            }
        }

        let population = self.layout.population();
        check_num(self.initial_sick, 0..=population).context("invalid initial sick count")?;
        check_num(self.initial_immune, 0..=population).context("invalid initial immune count")?;
        if self.initial_sick + self.initial_immune > population {
            bail!("initial sick plus initial immune must not exceed the population of {population}");
        }

        Ok(())
    }
}

fn parse_value<T>(words: &mut SplitWhitespace, keyword: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let word = words
        .next()
        .with_context(|| format!("missing value for keyword {keyword:?}"))?;
    word.parse()
        .with_context(|| format!("invalid value {word:?} for keyword {keyword:?}"))
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
