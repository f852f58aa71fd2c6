//! Key Derivation Module
//!
//! Turns call arguments into the textual keys used by the entry table.
//!
//! A key is the cache's qualifying name followed by one component per
//! positional argument and a name/value pair per named argument, joined with
//! [`KEY_DELIMITER`]. Values contribute through [`KeyRepr`]; values without a
//! meaningful canonical form can opt into identity keying with
//! [`ByIdentity`], at the cost of never hitting across distinct instances.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Separator between key components.
pub const KEY_DELIMITER: &str = ":";

/// Named arguments left out of keys unless a custom predicate is set.
pub const DEFAULT_IGNORED_NAMES: [&str; 2] = ["connection", "pool"];

// == Key Repr ==
/// Stable canonical representation of a value used as a key component.
///
/// Equal values must produce equal strings across calls.
pub trait KeyRepr {
    fn key_repr(&self) -> String;
}

macro_rules! key_repr_via_debug {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyRepr for $ty {
                fn key_repr(&self) -> String {
                    format!("{:?}", self)
                }
            }
        )*
    };
}

// Strings are quoted by Debug, so `1` and `"1"` stay distinct.
key_repr_via_debug!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String,
);

impl<T: KeyRepr + ?Sized> KeyRepr for &T {
    fn key_repr(&self) -> String {
        (**self).key_repr()
    }
}

impl<T: KeyRepr + ?Sized> KeyRepr for Box<T> {
    fn key_repr(&self) -> String {
        (**self).key_repr()
    }
}

impl<T: KeyRepr + ?Sized> KeyRepr for Arc<T> {
    fn key_repr(&self) -> String {
        (**self).key_repr()
    }
}

impl<T: KeyRepr + ?Sized> KeyRepr for Rc<T> {
    fn key_repr(&self) -> String {
        (**self).key_repr()
    }
}

impl<T: KeyRepr + ToOwned + ?Sized> KeyRepr for Cow<'_, T> {
    fn key_repr(&self) -> String {
        (**self).key_repr()
    }
}

impl<T: KeyRepr> KeyRepr for Option<T> {
    fn key_repr(&self) -> String {
        match self {
            Some(value) => format!("Some({})", value.key_repr()),
            None => "None".to_string(),
        }
    }
}

impl<T: KeyRepr> KeyRepr for [T] {
    fn key_repr(&self) -> String {
        let items: Vec<String> = self.iter().map(KeyRepr::key_repr).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: KeyRepr> KeyRepr for Vec<T> {
    fn key_repr(&self) -> String {
        self.as_slice().key_repr()
    }
}

// == By Identity ==
/// Keys a value by its address instead of its contents.
///
/// Two distinct live objects never collide, but a new instance never hits an
/// entry created for another one, even if both are equal.
///
/// Zero-sized values carry no address of their own: two distinct instances
/// on the stack may share one. Wrap the pointee of a heap handle instead,
/// e.g. `ByIdentity(&*arc)` for an `Arc<T>`, which stays distinct per
/// allocation even for zero-sized `T`.
pub struct ByIdentity<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> KeyRepr for ByIdentity<'_, T> {
    fn key_repr(&self) -> String {
        format!("<{} at {:p}>", type_name::<T>(), self.0 as *const T as *const ())
    }
}

impl<T: ?Sized> fmt::Debug for ByIdentity<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_repr())
    }
}

// == Key Policy ==
/// Decides which named arguments take part in a key.
#[derive(Clone)]
pub struct KeyPolicy {
    ignore_named_args: bool,
    ignore_named: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl KeyPolicy {
    pub fn new(
        ignore_named_args: bool,
        ignore_named: Arc<dyn Fn(&str) -> bool + Send + Sync>,
    ) -> Self {
        Self {
            ignore_named_args,
            ignore_named,
        }
    }

    /// Whether the named argument `name` is left out of the key.
    pub fn ignores(&self, name: &str) -> bool {
        self.ignore_named_args || (self.ignore_named)(name)
    }

    pub fn ignores_all_named(&self) -> bool {
        self.ignore_named_args
    }

    pub(crate) fn set_ignore_named_args(&mut self, ignore: bool) {
        self.ignore_named_args = ignore;
    }

    pub(crate) fn set_ignore_named(&mut self, predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>) {
        self.ignore_named = predicate;
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new(false, Arc::new(|name: &str| DEFAULT_IGNORED_NAMES.contains(&name)))
    }
}

impl fmt::Debug for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPolicy")
            .field("ignore_named_args", &self.ignore_named_args)
            .finish_non_exhaustive()
    }
}

// == Key Builder ==
/// Accumulates key components for one call.
pub struct KeyBuilder<'a> {
    parts: Vec<String>,
    policy: &'a KeyPolicy,
}

impl<'a> KeyBuilder<'a> {
    /// Starts a key with the cache's qualifying name.
    pub fn new(name: &str, policy: &'a KeyPolicy) -> Self {
        Self {
            parts: vec![name.to_string()],
            policy,
        }
    }

    /// Appends a positional argument.
    pub fn arg<V: KeyRepr + ?Sized>(&mut self, value: &V) -> &mut Self {
        self.parts.push(value.key_repr());
        self
    }

    /// Appends a named argument, unless the policy excludes `name`.
    pub fn named<V: KeyRepr + ?Sized>(&mut self, name: &str, value: &V) -> &mut Self {
        if !self.policy.ignores(name) {
            self.parts.push(name.key_repr());
            self.parts.push(value.key_repr());
        }
        self
    }

    /// Joins the components into the final key.
    pub fn finish(self) -> String {
        self.parts.join(KEY_DELIMITER)
    }
}

// == Cache Args ==
/// Arguments of a memoised call, written into a key in call order.
///
/// Tuples of [`KeyRepr`] values are keyed as positional arguments. Argument
/// structs with named parameters implement this by hand:
///
/// ```
/// use memo_cache::cache::{ByIdentity, CacheArgs, KeyBuilder};
///
/// struct FetchUser {
///     id: u64,
///     connection: std::sync::Arc<()>,
/// }
///
/// impl CacheArgs for FetchUser {
///     fn write_key(&self, key: &mut KeyBuilder<'_>) {
///         key.named("id", &self.id)
///             .named("connection", &ByIdentity(&*self.connection));
///     }
/// }
/// ```
pub trait CacheArgs {
    fn write_key(&self, key: &mut KeyBuilder<'_>);
}

impl CacheArgs for () {
    fn write_key(&self, _key: &mut KeyBuilder<'_>) {}
}

macro_rules! cache_args_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: KeyRepr),+> CacheArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn write_key(&self, key: &mut KeyBuilder<'_>) {
                let ($($name,)+) = self;
                $(key.arg($name);)+
            }
        }
    };
}

cache_args_for_tuple!(A);
cache_args_for_tuple!(A, B);
cache_args_for_tuple!(A, B, C);
cache_args_for_tuple!(A, B, C, D);
cache_args_for_tuple!(A, B, C, D, E);
cache_args_for_tuple!(A, B, C, D, E, F);

/// Derives the key for `args` under `name` and `policy`.
pub fn derive_key<A: CacheArgs + ?Sized>(name: &str, policy: &KeyPolicy, args: &A) -> String {
    let mut builder = KeyBuilder::new(name, policy);
    args.write_key(&mut builder);
    builder.finish()
}
