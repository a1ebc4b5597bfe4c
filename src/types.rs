use std::any::{type_name, TypeId};
use std::error::Error;

/// Name used when an unregistered error has no usable `Debug` form.
pub const UNNAMED_ERROR_TYPE: &str = "<unnamed error>";

/// Runtime handle for a concrete error type.
///
/// Pairs a reporting name with a downcast check so a `&dyn Error` coming
/// out of a `source()` chain can be identified after type erasure.
#[derive(Clone, Copy)]
pub struct ErrorType {
    name: &'static str,
    type_id: TypeId,
    matches: fn(&(dyn Error + 'static)) -> bool,
}

fn is_type<E: Error + 'static>(err: &(dyn Error + 'static)) -> bool {
    err.is::<E>()
}

impl ErrorType {
    /// Handle named after `std::any::type_name::<E>()`.
    pub fn of<E: Error + 'static>() -> Self {
        Self::named::<E>(type_name::<E>())
    }

    /// Handle with an explicit reporting name, e.g. `"std::io::Error"`
    /// instead of the private `std::io::error::Error` path.
    pub fn named<E: Error + 'static>(name: &'static str) -> Self {
        ErrorType {
            name,
            type_id: TypeId::of::<E>(),
            matches: is_type::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        (self.matches)(err)
    }
}

impl std::fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ErrorType").field(&self.name).finish()
    }
}

/// Set of error types the crate can name at runtime.
///
/// Passthrough types are configured by name and must resolve against this
/// registry, the same way a name has to resolve to a loaded type before it
/// can be used.
#[derive(Clone, Debug)]
pub struct ErrorTypeRegistry {
    known: Vec<ErrorType>,
}

impl ErrorTypeRegistry {
    /// Registry with no known types at all.
    pub fn empty() -> Self {
        ErrorTypeRegistry { known: Vec::new() }
    }

    /// Register `E` under its `type_name`.
    ///
    /// Returns the name `E` is reported under, which is the existing one
    /// if `E` was already registered.
    pub fn register<E: Error + 'static>(&mut self) -> &'static str {
        self.insert(ErrorType::of::<E>())
    }

    /// Register `E` under an explicit name. An earlier registration of `E`
    /// keeps its name.
    pub fn register_named<E: Error + 'static>(&mut self, name: &'static str) -> &'static str {
        self.insert(ErrorType::named::<E>(name))
    }

    fn insert(&mut self, ty: ErrorType) -> &'static str {
        if let Some(existing) = self.known.iter().find(|k| k.type_id == ty.type_id) {
            return existing.name;
        }
        if !self.known.iter().any(|k| k.name == ty.name) {
            self.known.push(ty);
        }
        ty.name
    }

    /// Look up a handle by its registered name.
    pub fn resolve(&self, name: &str) -> Option<&ErrorType> {
        let name = name.trim();
        self.known.iter().find(|k| k.name == name)
    }

    /// Reporting name for an error value.
    ///
    /// Registered types win; anything else is named by the leading path of
    /// its `Debug` output (`Os { .. }` becomes `Os`), falling back to
    /// [`UNNAMED_ERROR_TYPE`]. For an unregistered enum that head is the
    /// variant (`NotFound`, not `AppError`), so application error types
    /// should be registered to be reported under their own name.
    pub fn name_of(&self, err: &(dyn Error + 'static)) -> String {
        if let Some(ty) = self.known.iter().find(|k| k.matches(err)) {
            return ty.name.to_string();
        }
        debug_head(err).unwrap_or_else(|| UNNAMED_ERROR_TYPE.to_string())
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl Default for ErrorTypeRegistry {
    fn default() -> Self {
        let mut registry = ErrorTypeRegistry::empty();
        registry.register_named::<std::io::Error>("std::io::Error");
        registry.register_named::<std::fmt::Error>("std::fmt::Error");
        registry.register_named::<std::num::ParseIntError>("std::num::ParseIntError");
        registry.register_named::<std::num::ParseFloatError>("std::num::ParseFloatError");
        registry.register_named::<std::str::Utf8Error>("std::str::Utf8Error");
        registry.register_named::<std::string::FromUtf8Error>("std::string::FromUtf8Error");
        registry.register_named::<serde_json::Error>("serde_json::Error");
        registry
    }
}

fn debug_head(err: &dyn Error) -> Option<String> {
    let debug = format!("{:?}", err);
    let head: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    let head = head.trim_end_matches(':');
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped")]
    struct Wrapper;

    #[derive(Debug)]
    struct Opaque;

    impl std::fmt::Display for Opaque {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("opaque")
        }
    }

    impl Error for Opaque {}

    #[test]
    fn default_registry_names_std_errors() {
        let registry = ErrorTypeRegistry::default();
        let io = std::io::Error::other("disk on fire");
        assert_eq!(registry.name_of(&io), "std::io::Error");

        let parse = "x".parse::<u32>().unwrap_err();
        assert_eq!(registry.name_of(&parse), "std::num::ParseIntError");
    }

    #[test]
    fn register_uses_type_name() {
        let mut registry = ErrorTypeRegistry::empty();
        let name = registry.register::<Wrapper>();
        assert!(name.ends_with("Wrapper"));
        assert_eq!(registry.name_of(&Wrapper), name);
        assert!(registry.resolve(name).is_some());
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let registry = ErrorTypeRegistry::default();
        assert!(registry.resolve("my_app::NotRegistered").is_none());
        assert!(registry.resolve(" std::io::Error ").is_some());
    }

    #[test]
    fn unregistered_errors_fall_back_to_debug_head() {
        let registry = ErrorTypeRegistry::empty();
        assert_eq!(registry.name_of(&Opaque), "Opaque");

        let boxed: Box<dyn Error> = "plain string".into();
        assert_eq!(registry.name_of(&*boxed), UNNAMED_ERROR_TYPE);
    }

    #[test]
    fn reregistering_keeps_the_existing_name() {
        let mut registry = ErrorTypeRegistry::default();
        let before = registry.len();
        assert_eq!(registry.register::<std::io::Error>(), "std::io::Error");
        assert_eq!(registry.register_named::<serde_json::Error>("json"), "serde_json::Error");
        assert_eq!(registry.len(), before);
        assert!(registry.resolve("json").is_none());
    }

    #[derive(Debug, thiserror::Error)]
    enum AppError {
        #[error("no such order")]
        NotFound,
    }

    #[test]
    fn unregistered_enums_are_named_by_variant() {
        let mut registry = ErrorTypeRegistry::empty();
        assert_eq!(registry.name_of(&AppError::NotFound), "NotFound");

        let name = registry.register::<AppError>();
        assert!(name.ends_with("AppError"), "{name}");
        assert_eq!(registry.name_of(&AppError::NotFound), name);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = ErrorTypeRegistry::empty();
        registry.register::<Wrapper>();
        registry.register::<Wrapper>();
        assert_eq!(registry.len(), 1);
    }
}
