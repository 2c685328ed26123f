// ABOUTME: Helper groups for Handlebars templates and their registration
// ABOUTME: Groups can be enabled individually and registered under an optional name prefix

pub mod array;
mod block;
mod json;
pub mod matching;
pub mod object;
pub mod path;
pub mod url;

pub use block::render_in_block;

use handlebars::{Handlebars, HelperDef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HelperError, Result};

/// A set of related helpers that is registered as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperGroup {
    Array,
    Object,
    Path,
    Url,
    Match,
}

impl HelperGroup {
    pub const ALL: [HelperGroup; 5] = [
        HelperGroup::Array,
        HelperGroup::Object,
        HelperGroup::Path,
        HelperGroup::Url,
        HelperGroup::Match,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HelperGroup::Array => "array",
            HelperGroup::Object => "object",
            HelperGroup::Path => "path",
            HelperGroup::Url => "url",
            HelperGroup::Match => "match",
        }
    }

    fn register(&self, registrar: &mut Registrar<'_, '_>) {
        match self {
            HelperGroup::Array => array::register(registrar),
            HelperGroup::Object => object::register(registrar),
            HelperGroup::Path => path::register(registrar),
            HelperGroup::Url => url::register(registrar),
            HelperGroup::Match => matching::register(registrar),
        }
    }
}

impl fmt::Display for HelperGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HelperGroup {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        HelperGroup::ALL
            .into_iter()
            .find(|group| group.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| HelperError::UnknownGroup(name.to_string()))
    }
}

/// Registers helpers under a common name prefix.
pub(crate) struct Registrar<'a, 'reg> {
    handlebars: &'a mut Handlebars<'reg>,
    prefix: &'a str,
    count: usize,
}

impl<'a, 'reg> Registrar<'a, 'reg> {
    fn new(handlebars: &'a mut Handlebars<'reg>, prefix: &'a str) -> Self {
        Self {
            handlebars,
            prefix,
            count: 0,
        }
    }

    pub(crate) fn add(&mut self, name: &str, helper: impl HelperDef + Send + Sync + 'reg) {
        let full_name = format!("{}{}", self.prefix, name);
        self.handlebars.register_helper(&full_name, Box::new(helper));
        self.count += 1;
    }
}

/// Register the given helper groups, prefixing every helper name with
/// `prefix`.
pub fn register_groups(
    handlebars: &mut Handlebars,
    groups: &[HelperGroup],
    prefix: &str,
) -> Result<()> {
    let mut registrar = Registrar::new(handlebars, prefix);
    for group in groups {
        let before = registrar.count;
        group.register(&mut registrar);
        debug!(
            "Registered {} {} helpers",
            registrar.count - before,
            group.name()
        );
    }
    Ok(())
}

/// Register every helper group without a prefix.
pub fn register_helpers(handlebars: &mut Handlebars) -> Result<()> {
    register_groups(handlebars, &HelperGroup::ALL, "")
}
