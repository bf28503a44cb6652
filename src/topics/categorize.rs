use crate::types::{TopicCategories, TopicCategory};

/// Most uncategorized topics reported under `other`
pub const OTHER_LIMIT: usize = 3;

/// Substring match in either direction, case-insensitive.
///
/// Loose on purpose: "spacious" lands in facilities through "spa".
fn matches_keyword(topic: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    topic.contains(&keyword) || keyword.contains(topic)
}

/// Map selected topics into categories. Empty categories are left out.
pub fn categorize(topics: &[String]) -> TopicCategories {
    let mut categories = TopicCategories::new();
    let mut other = Vec::new();

    for topic in topics {
        let lowered = topic.to_lowercase();
        let mut matched = false;
        for category in TopicCategory::KEYWORDED {
            if category
                .keywords()
                .iter()
                .any(|k| matches_keyword(&lowered, k))
            {
                categories.entry(category).or_default().push(topic.clone());
                matched = true;
            }
        }
        if !matched && other.len() < OTHER_LIMIT {
            other.push(topic.clone());
        }
    }

    if !other.is_empty() {
        categories.insert(TopicCategory::Other, other);
    }
    categories
}
