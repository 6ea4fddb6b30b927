use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TokenFrequency
/// Counts token occurrences, keeping the order in which tokens were first seen.
/// The builder keeps one per record and one global table for the whole dataset.
///
/// # Examples
/// ```
/// use related_content::TokenFrequency;
/// let mut token_freq = TokenFrequency::new();
/// token_freq.add_text("Rust is fast, rust is safe");
///
/// assert_eq!(token_freq.token_count("rust"), 2);
/// assert_eq!(token_freq.token_set_ref_str()[0], "rust");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
    total_token_count: u64,
}

/// Adding tokens
impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
            total_token_count: 0,
        }
    }

    /// Count one token as is
    ///
    /// # Arguments
    /// * `token` - token to count
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        // 既存tokenなら位置はそのまま
        if let Some(count) = self.token_count.get_mut(token) {
            *count += 1;
        } else {
            self.token_count.insert(token.to_string(), 1);
        }
        self.total_token_count += 1;
        self
    }

    /// Count several tokens
    ///
    /// # Arguments
    /// * `tokens` - tokens to count
    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }

    /// Split `text` on whitespace, lowercase each piece and count it
    ///
    /// # Arguments
    /// * `text` - raw text blob
    #[inline]
    pub fn add_text(&mut self, text: &str) -> &mut Self {
        for word in tokenize(text) {
            self.add_token(&word);
        }
        self
    }

    /// Add every count of `other`, appending its new tokens in its own order
    ///
    /// # Arguments
    /// * `other` - counts to fold in
    #[inline]
    pub fn merge(&mut self, other: &TokenFrequency) -> &mut Self {
        for (token, &count) in &other.token_count {
            if let Some(existing) = self.token_count.get_mut(token) {
                *existing += count;
            } else {
                self.token_count.insert(token.clone(), count);
            }
        }
        self.total_token_count += other.total_token_count;
        self
    }

    /// Reset every count
    #[inline]
    pub fn clear(&mut self) {
        self.token_count.clear();
        self.total_token_count = 0;
    }
}

/// Reading counts
impl TokenFrequency {
    /// Occurrences of `token`, 0 when it was never counted
    ///
    /// # Arguments
    /// * `token` - token to look up
    ///
    /// # Returns
    /// * `u32` - occurrence count
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        self.token_count.get(token).copied().unwrap_or(0)
    }

    /// Sum of every count
    #[inline]
    pub fn token_total_count(&self) -> u64 {
        self.total_token_count
    }

    /// Number of distinct tokens
    #[inline]
    pub fn token_num(&self) -> usize {
        self.token_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count.is_empty()
    }

    #[inline]
    pub fn contains_token(&self, token: &str) -> bool {
        self.token_count.contains_key(token)
    }

    /// (token, count) pairs in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token_count.iter().map(|(token, &count)| (token.as_str(), count))
    }

    /// Distinct tokens in first-seen order
    ///
    /// # Returns
    /// * `Vec<&str>` - borrowed tokens
    #[inline]
    pub fn token_set_ref_str(&self) -> Vec<&str> {
        self.token_count.keys().map(|s| s.as_str()).collect()
    }

    /// Project the counts onto an ordered vocabulary
    ///
    /// # Arguments
    /// * `columns` - vocabulary, defines the vector positions
    ///
    /// # Returns
    /// * `Vec<u32>` - one count per column, 0 for absent tokens
    #[inline]
    pub fn project<T>(&self, columns: &[T]) -> Vec<u32>
    where
        T: AsRef<str>,
    {
        columns.iter().map(|column| self.token_count(column.as_ref())).collect()
    }
}

/// Whitespace split + lowercase. No punctuation stripping.
#[inline]
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|word| word.to_lowercase())
}
