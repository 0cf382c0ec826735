use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::slot::SlotId;

/// Address of a document in a store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The most recently written document.
    Latest,
    /// A raw buffer position.
    Slot(SlotId),
    /// A symbolic name bound by a previous write.
    Name(String),
}

impl Key {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn slot(index: usize) -> Self {
        Self::Slot(SlotId::new(index))
    }
}

impl From<SlotId> for Key {
    fn from(slot: SlotId) -> Self {
        Self::Slot(slot)
    }
}

/// Parses textual keys as used on the command line.
///
/// `latest` selects the head, a decimal integer selects a slot, anything
/// else is taken as a name. A name that looks like an integer can only be
/// addressed through [`Key::Name`] directly.
impl FromStr for Key {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TypeError::InvalidKey(s.to_string()));
        }
        if s == "latest" {
            return Ok(Self::Latest);
        }
        match s.parse::<usize>() {
            Ok(index) => Ok(Self::slot(index)),
            Err(_) => Ok(Self::Name(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Slot(slot) => write!(f, "slot {slot}"),
            Self::Name(name) => write!(f, "name {name:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keys() {
        assert_eq!("latest".parse::<Key>().unwrap(), Key::Latest);
        assert_eq!("12".parse::<Key>().unwrap(), Key::slot(12));
        assert_eq!("front-page".parse::<Key>().unwrap(), Key::name("front-page"));
        assert_eq!("-1".parse::<Key>().unwrap(), Key::name("-1"));
    }

    #[test]
    fn empty_key_is_invalid() {
        assert!(matches!("".parse::<Key>(), Err(TypeError::InvalidKey(_))));
    }

    #[test]
    fn display() {
        assert_eq!(Key::Latest.to_string(), "latest");
        assert_eq!(Key::slot(3).to_string(), "slot 3");
        assert_eq!(Key::name("x").to_string(), "name \"x\"");
    }
}
