/// Candidates offered by [`Hashtags::add_suggested`], in offer order.
pub const SUGGESTED_HASHTAGS: [&str; 6] = [
    "#Marketing",
    "#SocialMedia",
    "#Business",
    "#Sale",
    "#NewPost",
    "#DigitalMarketing",
];

const SUGGESTIONS_PER_CALL: usize = 3;

/// Ordered set of `#`-prefixed tags. Duplicates are detected on the
/// normalized form, case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hashtags(Vec<String>);

/// Trim and prefix with `#`. Returns `None` for input with no tag text.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if body.is_empty() {
        return None;
    }
    Some(format!("#{}", body))
}

impl Hashtags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `raw` after normalizing. Returns whether a tag was added.
    pub fn add(&mut self, raw: &str) -> bool {
        match normalize(raw) {
            Some(tag) if !self.contains(&tag) => {
                self.0.push(tag);
                true
            }
            _ => false,
        }
    }

    /// Remove an exact match. Returns whether anything was removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Append up to three suggestions not already present. Returns how many
    /// were added.
    pub fn add_suggested(&mut self) -> usize {
        let fresh: Vec<&str> = SUGGESTED_HASHTAGS
            .iter()
            .copied()
            .filter(|tag| !self.contains(tag))
            .take(SUGGESTIONS_PER_CALL)
            .collect();
        for tag in &fresh {
            self.0.push(tag.to_string());
        }
        fresh.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}
