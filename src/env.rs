use std::str::FromStr;

use envconfig::Envconfig;
use lazy_static::lazy_static;

lazy_static! {
    pub static ref ENV_VARS: EnvVars = EnvVars::from_env().unwrap();
}

/// Environment toggles for schema generation. All variables are optional
/// and default to the full feature set.
#[derive(Clone, Debug)]
pub struct EnvVars {
    inner: Inner,
}

impl EnvVars {
    pub fn from_env() -> Result<Self, envconfig::Error> {
        let inner = Inner::init_from_env()?;
        Ok(Self { inner })
    }

    /// Skip the `AND`/`OR`/`NOT` combinators when generating `Where` types.
    pub fn disable_bool_filters(&self) -> bool {
        self.inner.disable_bool_filters.0
    }

    /// Skip the relationship filter fields (`_ALL`, `_NONE`, `_SINGLE`,
    /// `_SOME` and their single-target counterparts) when generating
    /// `Where` types.
    pub fn disable_relationship_filters(&self) -> bool {
        self.inner.disable_relationship_filters.0
    }
}

#[derive(Clone, Debug, Envconfig)]
struct Inner {
    #[envconfig(from = "GRAPH_AUGMENT_DISABLE_BOOL_FILTERS", default = "false")]
    disable_bool_filters: EnvVarBoolean,
    #[envconfig(from = "GRAPH_AUGMENT_DISABLE_RELATIONSHIP_FILTERS", default = "false")]
    disable_relationship_filters: EnvVarBoolean,
}

/// A boolean that accepts the conventional spellings for environment
/// variables: `true`/`false`, `1`/`0`, and the empty string.
#[derive(Copy, Clone, Debug)]
pub struct EnvVarBoolean(pub bool);

impl FromStr for EnvVarBoolean {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "false" | "0" => Ok(Self(false)),
            "true" | "1" => Ok(Self(true)),
            _ => Err("invalid environment variable flag, expected true/false or 1/0".to_string()),
        }
    }
}
