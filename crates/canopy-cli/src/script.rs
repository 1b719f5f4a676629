//! Gesture scripts replayed by `canopy run`.
//!
//! ```toml
//! [[step]]
//! action = "expand"
//! id = 1
//!
//! [[step]]
//! action = "click"
//! id = "3"
//! modifiers = { ctrl = true }
//!
//! [[step]]
//! action = "search"
//! phrase = "blood"
//! ```

use canopy_core::{Modifiers, NodeKey};
use serde::Deserialize;

/// One user gesture or host action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    Click {
        id: NodeKey,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Expand {
        id: NodeKey,
    },
    Collapse {
        id: NodeKey,
    },
    /// Rebuild the snapshot with a new search phrase.
    Search {
        #[serde(default)]
        phrase: String,
    },
    Clear,
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
