//! Life-sphere category tags and their static display metadata.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Category of life an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sphere {
    Education,
    Career,
    Family,
    Health,
    Friends,
    Place,
    Finance,
    Hobby,
    Other,
}

/// Display metadata for one sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereMeta {
    /// CSS hex colour used for the event dot and its branches.
    pub color: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
}

impl Sphere {
    pub const ALL: [Sphere; 9] = [
        Sphere::Education,
        Sphere::Career,
        Sphere::Family,
        Sphere::Health,
        Sphere::Friends,
        Sphere::Place,
        Sphere::Finance,
        Sphere::Hobby,
        Sphere::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Education => "education",
            Self::Career => "career",
            Self::Family => "family",
            Self::Health => "health",
            Self::Friends => "friends",
            Self::Place => "place",
            Self::Finance => "finance",
            Self::Hobby => "hobby",
            Self::Other => "other",
        }
    }

    pub fn meta(self) -> SphereMeta {
        let (color, label, emoji) = match self {
            Self::Education => ("#a5b4fc", "Education", "🎓"),
            Self::Career => ("#7dd3fc", "Career", "💼"),
            Self::Family => ("#fca5a5", "Family", "❤️"),
            Self::Health => ("#86efac", "Health", "💪"),
            Self::Friends => ("#fcd34d", "Friends", "🤝"),
            Self::Place => ("#c4b5fd", "Place / relocation", "🏠"),
            Self::Finance => ("#6ee7b7", "Finance", "💰"),
            Self::Hobby => ("#f9a8d4", "Hobby", "🎨"),
            Self::Other => ("#cbd5e1", "Other", "⭐"),
        };
        SphereMeta {
            color,
            label,
            emoji,
        }
    }

    pub fn color(self) -> &'static str {
        self.meta().color
    }
}

impl Display for Sphere {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sphere {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Sphere::ALL
            .into_iter()
            .find(|sphere| sphere.as_str() == normalized)
            .ok_or_else(|| format!("unknown sphere `{value}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::Sphere;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Career ".parse::<Sphere>().unwrap(), Sphere::Career);
        assert!("sports".parse::<Sphere>().is_err());
    }

    #[test]
    fn every_sphere_has_a_hex_color() {
        for sphere in Sphere::ALL {
            let color = sphere.color();
            assert!(color.starts_with('#') && color.len() == 7, "{sphere}");
        }
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        assert_eq!(
            serde_json::to_string(&Sphere::Finance).unwrap(),
            "\"finance\""
        );
    }
}
