//! Configuration loading
//!
//! A chain is described in TOML. Bones name their parent, so the file can list
//! them in any order; assembly checks that they form one unbranched chain.
//!
//! ```toml
//! target = [1.5, 0.0, -2.0]
//!
//! [simulation]
//! frames = 240
//! delta_time = 0.016
//!
//! [logging]
//! level = "info"
//!
//! [[bones]]
//! name = "shoulder"
//! max_rotation_angle = 90.0
//!
//! [[bones]]
//! name = "elbow"
//! parent = "shoulder"
//! offset = [0.0, 0.0, -1.0]
//! ```

use crate::error::{ChainError, ConfigError};
use crate::ik::{BoneSettings, Chain, Thresholds};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec3>,
    pub thresholds: Thresholds,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    pub bones: Vec<BoneConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub frames: u32,
    pub delta_time: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter, overridden by `RUST_LOG`.
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub settings: BoneSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            delta_time: 1.0 / 60.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// A three-bone arm reaching for a point off to its right.
    pub fn demo_arm() -> Self {
        let bone = |name: &str, parent: Option<&str>, offset: Vec3, max_angle: f32| BoneConfig {
            parent: parent.map(str::to_string),
            settings: BoneSettings::new(offset)
                .name(name)
                .max_rotation_angle(max_angle),
        };

        Self {
            target: Some(Vec3::new(1.5, 0.5, -2.0)),
            bones: vec![
                bone("shoulder", None, Vec3::ZERO, 90.0),
                bone("elbow", Some("shoulder"), Vec3::NEG_Z, 120.0),
                bone("wrist", Some("elbow"), Vec3::NEG_Z, 160.0),
            ],
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.simulation.delta_time.is_finite() || self.simulation.delta_time < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "simulation.delta_time".to_string(),
                reason: format!("{} is not a non-negative number", self.simulation.delta_time),
            });
        }
        self.thresholds.validate()?;
        Ok(())
    }

    /// Overrides simulation settings from command line flags.
    ///
    /// Supported flags: `--frames <n>` and `--dt <seconds>`.
    pub fn apply_args<I>(&mut self, args: I) -> Result<(), ConfigError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if let Some(value) = flag_value(&args, "--frames") {
            self.simulation.frames = value.parse().map_err(|_| ConfigError::InvalidValue {
                field: "--frames".to_string(),
                reason: format!("`{value}` is not a frame count"),
            })?;
        }

        if let Some(value) = flag_value(&args, "--dt") {
            self.simulation.delta_time = value.parse().map_err(|_| ConfigError::InvalidValue {
                field: "--dt".to_string(),
                reason: format!("`{value}` is not a number"),
            })?;
        }

        self.validate()
    }

    /// Orders the bones root to tip and builds the chain.
    pub fn build_chain(&self) -> Result<Chain, ConfigError> {
        let bones = assemble(&self.bones)?;
        let mut builder = Chain::builder().bones(bones).thresholds(self.thresholds);
        if let Some(target) = self.target {
            builder = builder.target(target);
        }
        Ok(builder.build()?)
    }
}

/// Flags `apply_args` understands; each takes one value.
const VALUE_FLAGS: [&str; 2] = ["--frames", "--dt"];

/// First argument that is neither a flag nor a flag's value.
pub fn config_path(args: &[String]) -> Option<&str> {
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_value = true;
        } else if !arg.starts_with("--") {
            return Some(arg);
        }
    }
    None
}

/// Flags `apply_args` does not know about.
pub fn unknown_flags(args: &[String]) -> Vec<&str> {
    args.iter()
        .map(String::as_str)
        .filter(|a| a.starts_with("--") && !VALUE_FLAGS.contains(a))
        .collect()
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Resolves parent names into a root-to-tip ordering.
///
/// Fails on duplicate or unknown names, on anything but exactly one root, on
/// a bone with more than one child, and on bones the root never reaches.
pub fn assemble(bones: &[BoneConfig]) -> Result<Vec<BoneSettings>, ChainError> {
    if bones.is_empty() {
        return Err(ChainError::Empty);
    }

    let names: Vec<String> = bones
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if b.settings.name.is_empty() {
                format!("bone{i}")
            } else {
                b.settings.name.clone()
            }
        })
        .collect();

    let mut index_of = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if index_of.insert(name.as_str(), i).is_some() {
            return Err(ChainError::DuplicateName(name.clone()));
        }
    }

    let mut roots = Vec::new();
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, bone) in bones.iter().enumerate() {
        match &bone.parent {
            None => roots.push(i),
            Some(parent) => {
                let &p = index_of
                    .get(parent.as_str())
                    .ok_or_else(|| ChainError::UnknownParent {
                        bone: names[i].clone(),
                        parent: parent.clone(),
                    })?;
                children.entry(p).or_default().push(i);
            }
        }
    }

    let mut branching: Vec<_> = children.iter().filter(|(_, c)| c.len() > 1).collect();
    branching.sort_by_key(|(p, _)| **p);
    if let Some((&parent, kids)) = branching.first() {
        return Err(ChainError::Branching {
            parent: names[parent].clone(),
            children: kids.iter().map(|&k| names[k].clone()).collect(),
        });
    }

    let root = match roots.as_slice() {
        [] => return Err(ChainError::NoRoot),
        [root] => *root,
        many => {
            return Err(ChainError::MultipleRoots(
                many.iter().map(|&r| names[r].clone()).collect(),
            ))
        }
    };

    let mut order = vec![root];
    let mut current = root;
    while let Some(&next) = children.get(&current).and_then(|c| c.first()) {
        if order.len() >= bones.len() {
            break;
        }
        order.push(next);
        current = next;
    }

    if order.len() < bones.len() {
        let unreachable = (0..bones.len())
            .filter(|i| !order.contains(i))
            .map(|i| names[i].clone())
            .collect();
        return Err(ChainError::Unreachable(unreachable));
    }

    Ok(order
        .into_iter()
        .map(|i| {
            let mut settings = bones[i].settings.clone();
            settings.name = names[i].clone();
            settings
        })
        .collect())
}
