use crate::model::Amount;
use serde::{Deserialize, Deserializer, Serialize};

/// The emoji used when a favorite is saved without one.
pub const DEFAULT_EMOJI: &str = "⚡";

/// A saved expense template that can be turned into a real expense in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    #[serde(deserialize_with = "string_or_number")]
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) amount: Amount,
    pub(crate) category: String,
    #[serde(default = "default_emoji")]
    pub(crate) emoji: String,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

/// The browser client used millisecond timestamps as ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

impl Favorite {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// The description given to expenses created from this favorite.
    pub fn quick_add_description(&self) -> String {
        format!("Quick add: {} {}", self.emoji, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_default_emoji_and_numeric_id() {
        let json =
            r#"{"id": 1718000000000, "title": "Coffee", "amount": "60", "category": "Food"}"#;
        let favorite: Favorite = serde_json::from_str(json).unwrap();
        assert_eq!(favorite.id(), "1718000000000");
        assert_eq!(favorite.emoji(), DEFAULT_EMOJI);
        assert_eq!(favorite.quick_add_description(), "Quick add: ⚡ Coffee");
    }
}
