use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for slide and layer IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter shared by every generated ID so prefixes never collide.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh interned key `{prefix}_{n}` that is not already in use.
///
/// IDs loaded from a saved deck are interned on deserialize, so skipping
/// anything already interned keeps generated IDs unique within the process.
fn fresh_key(prefix: &str) -> Spur {
    loop {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let candidate = format!("{prefix}_{n}");
        if !INTERNER.contains(&candidate) {
            return INTERNER.get_or_intern(candidate);
        }
    }
}

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an ID, or return the existing one.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a unique ID (e.g. `layer_12`).
            pub fn generate() -> Self {
                Self(fresh_key($prefix))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identity of a slide within a deck. 4 bytes, Copy, O(1) Eq/Hash.
    SlideId,
    "slide"
);

interned_id!(
    /// Identity of a text layer within a slide. 4 bytes, Copy, O(1) Eq/Hash.
    LayerId,
    "layer"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = LayerId::intern("headline");
        let b = LayerId::intern("headline");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "headline");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = SlideId::generate();
        let b = SlideId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("slide_"));
    }

    #[test]
    fn generated_ids_skip_loaded_ids() {
        // Simulate a deck that already used the next few generated names.
        let next = COUNTER.load(Ordering::Relaxed);
        for n in next..next + 3 {
            LayerId::intern(&format!("layer_{n}"));
        }
        let fresh = LayerId::generate();
        for n in next..next + 3 {
            assert_ne!(fresh.as_str(), format!("layer_{n}"));
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = LayerId::intern("caption");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"caption\"");
        let back: LayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
