//! Byte rotation used to obfuscate script payloads inside ARC archives
//!
//! The engine stores compiled scenario scripts (`.ws2`) with every byte
//! rotated left by two bits. The transform is selected purely by the entry
//! name's suffix and always covers the whole payload.

/// Suffix of the entries the engine stores obfuscated
pub const DEFAULT_OBFUSCATED_SUFFIX: &str = ".ws2";

/// Rotate a byte left by two bits (pack direction)
#[inline]
pub const fn rotate_left_2(b: u8) -> u8 {
    b.rotate_left(2)
}

/// Rotate a byte right by two bits (unpack direction)
#[inline]
pub const fn rotate_right_2(b: u8) -> u8 {
    b.rotate_right(2)
}

/// Apply the forward rotation to every byte of `data` in place
pub fn obfuscate(data: &mut [u8]) {
    for b in data.iter_mut() {
        *b = rotate_left_2(*b);
    }
}

/// Apply the inverse rotation to every byte of `data` in place
pub fn deobfuscate(data: &mut [u8]) {
    for b in data.iter_mut() {
        *b = rotate_right_2(*b);
    }
}

/// Decides which archive entries carry the obfuscation transform
///
/// Matching is an ASCII case-insensitive suffix comparison on the entry
/// name. A disabled rule never matches, so payloads pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscationRule {
    suffix: String,
    enabled: bool,
}

impl ObfuscationRule {
    /// Create an enabled rule for the given suffix
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            enabled: true,
        }
    }

    /// A rule that never matches
    pub fn disabled() -> Self {
        Self {
            suffix: String::new(),
            enabled: false,
        }
    }

    /// Enable or disable the rule without changing its suffix
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The configured suffix
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the rule is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check whether `name` should be transformed
    pub fn matches(&self, name: &str) -> bool {
        if !self.enabled || self.suffix.is_empty() || name.len() < self.suffix.len() {
            return false;
        }
        let tail = &name.as_bytes()[name.len() - self.suffix.len()..];
        tail.eq_ignore_ascii_case(self.suffix.as_bytes())
    }

    /// Forward transform for `name`, returns whether it was applied
    pub fn apply_forward(&self, name: &str, data: &mut [u8]) -> bool {
        let hit = self.matches(name);
        if hit {
            obfuscate(data);
        }
        hit
    }

    /// Inverse transform for `name`, returns whether it was applied
    pub fn apply_inverse(&self, name: &str, data: &mut [u8]) -> bool {
        let hit = self.matches(name);
        if hit {
            deobfuscate(data);
        }
        hit
    }
}

impl Default for ObfuscationRule {
    fn default() -> Self {
        Self::new(DEFAULT_OBFUSCATED_SUFFIX)
    }
}
