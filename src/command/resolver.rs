//! Handler registry - resolves command names to invocable methods
//!
//! A [`HandlerSet`] is the capability set a process exposes to the console.
//! Each [`Method`] carries its ordered parameter kinds (for arity checks and
//! coercion) and a type-erased invoker. Typed closures get their kinds from
//! the [`Param`] impls of their argument types:
//!
//! ```ignore
//! let set = HandlerSet::new()
//!     .method("Add", |a: i64, b: i64| a + b)
//!     .method("Hello", |loud: bool| -> Result<String, BoxError> { ... });
//! ```

use std::any::Any;

use ahash::AHashMap;
use serde::Serialize;

use crate::core::error::{BoxError, CodedError, DispatchError};
use crate::core::types::{Arg, ParamKind};

/// What a handler hands back, before normalization
pub enum Return {
    /// No return slots
    Empty,
    /// A single value slot
    Value(serde_json::Value),
    /// A single error-typed slot
    Error(BoxError),
    /// A value slot followed by an error slot; `None` means no error
    ValueOrError(serde_json::Value, Option<BoxError>),
}

impl std::fmt::Debug for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Return::Empty => write!(f, "Empty"),
            Return::Value(v) => write!(f, "Value({})", v),
            Return::Error(e) => write!(f, "Error({})", e),
            Return::ValueOrError(v, None) => write!(f, "ValueOrError({}, None)", v),
            Return::ValueOrError(v, Some(e)) => write!(f, "ValueOrError({}, {})", v, e),
        }
    }
}

/// Conversion from a handler's native return type
pub trait IntoReturn {
    /// Fails only when the value cannot be represented as JSON
    fn into_return(self) -> Result<Return, DispatchError>;
}

impl IntoReturn for Return {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(self)
    }
}

impl IntoReturn for () {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Empty)
    }
}

impl IntoReturn for serde_json::Value {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Value(self))
    }
}

impl IntoReturn for BoxError {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Error(self))
    }
}

impl IntoReturn for CodedError {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Error(Box::new(self)))
    }
}

impl<T: IntoReturn> IntoReturn for Option<T> {
    fn into_return(self) -> Result<Return, DispatchError> {
        match self {
            Some(value) => value.into_return(),
            None => Ok(Return::Empty),
        }
    }
}

impl<T, E> IntoReturn for Result<T, E>
where
    T: Serialize + 'static,
    E: Into<BoxError>,
{
    fn into_return(self) -> Result<Return, DispatchError> {
        match self {
            Ok(value) => Ok(Return::ValueOrError(to_json(&value)?, None)),
            Err(err) => Ok(Return::ValueOrError(
                serde_json::Value::Null,
                Some(err.into()),
            )),
        }
    }
}

macro_rules! impl_into_return_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoReturn for $ty {
                fn into_return(self) -> Result<Return, DispatchError> {
                    Ok(Return::Value(serde_json::Value::from(self)))
                }
            }
        )*
    };
}

impl_into_return_scalar!(
    isize, i8, i16, i32, i64, usize, u8, u16, u32, u64, bool, String, &'static str
);

impl IntoReturn for f32 {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Value(to_json(&self)?))
    }
}

impl IntoReturn for f64 {
    fn into_return(self) -> Result<Return, DispatchError> {
        Ok(Return::Value(to_json(&self)?))
    }
}

// serde_json writes NaN and the infinities as null, which would read as "no result".
fn to_json<T: Serialize + 'static>(value: &T) -> Result<serde_json::Value, DispatchError> {
    let value_any = value as &dyn Any;
    let non_finite = match (
        value_any.downcast_ref::<f64>(),
        value_any.downcast_ref::<f32>(),
    ) {
        (Some(v), _) if !v.is_finite() => Some(v.to_string()),
        (_, Some(v)) if !v.is_finite() => Some(v.to_string()),
        _ => None,
    };
    if let Some(text) = non_finite {
        return Err(DispatchError::Fault(format!(
            "unserializable result: {}",
            text
        )));
    }

    serde_json::to_value(value)
        .map_err(|e| DispatchError::Fault(format!("unserializable result: {}", e)))
}

/// A scalar type a handler can declare as a parameter
pub trait Param: Sized {
    const KIND: ParamKind;

    fn from_arg(arg: Arg) -> Option<Self>;
}

macro_rules! impl_param {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl Param for $ty {
                const KIND: ParamKind = ParamKind::$variant;

                fn from_arg(arg: Arg) -> Option<Self> {
                    match arg {
                        Arg::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_param!(
    isize => Int, i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    usize => Uint, u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64, bool => Bool, String => Str
);

/// Type-erased handler invocation over coerced arguments
pub type Invoker = Box<dyn Fn(Vec<Arg>) -> Result<Return, DispatchError> + Send + Sync>;

/// Closures that can be registered as methods, keyed by their argument tuple
pub trait IntoMethod<Args>: Send + Sync + 'static {
    fn kinds() -> Vec<ParamKind>;

    fn into_invoker(self) -> Invoker;
}

fn next_param<T: Param>(args: &mut impl Iterator<Item = Arg>) -> Result<T, DispatchError> {
    match args.next() {
        Some(arg) => {
            let found = arg.kind();
            T::from_arg(arg).ok_or_else(|| {
                DispatchError::Fault(format!(
                    "handler expects {} but was given {}",
                    T::KIND,
                    found
                ))
            })
        }
        None => Err(DispatchError::Fault(format!(
            "handler expects {} but was given nothing",
            T::KIND
        ))),
    }
}

macro_rules! impl_into_method {
    ($($ty:ident $arg:ident),*) => {
        impl<F, R, $($ty,)*> IntoMethod<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($ty: Param,)*
        {
            fn kinds() -> Vec<ParamKind> {
                vec![$($ty::KIND),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn into_invoker(self) -> Invoker {
                Box::new(move |args: Vec<Arg>| {
                    let mut args = args.into_iter();
                    $(let $arg = next_param::<$ty>(&mut args)?;)*
                    (self)($($arg),*).into_return()
                })
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A a);
impl_into_method!(A a, B b);
impl_into_method!(A a, B b, C c);
impl_into_method!(A a, B b, C c, D d);
impl_into_method!(A a, B b, C c, D d, E e);
impl_into_method!(A a, B b, C c, D d, E e, G g);

/// A registered, invocable method
pub struct Method {
    params: Vec<ParamKind>,
    invoke: Invoker,
}

impl Method {
    /// Declared parameter kinds in call order
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn invoke(&self, args: Vec<Arg>) -> Result<Return, DispatchError> {
        (self.invoke)(args)
    }
}

/// Named methods exposed for dispatch
#[derive(Default)]
pub struct HandlerSet {
    methods: AHashMap<String, Method>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed closure; a repeated name replaces the earlier method
    pub fn method<Args, F>(mut self, name: &str, handler: F) -> Self
    where
        F: IntoMethod<Args>,
    {
        self.methods.insert(
            name.to_string(),
            Method {
                params: F::kinds(),
                invoke: handler.into_invoker(),
            },
        );
        self
    }

    /// Register an untyped invoker with an explicit parameter list
    ///
    /// `params` may name kinds the coercion table does not support; calls to
    /// such a method fail at coercion time.
    pub fn raw_method<F>(mut self, name: &str, params: Vec<ParamKind>, handler: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Result<Return, DispatchError> + Send + Sync + 'static,
    {
        self.methods.insert(
            name.to_string(),
            Method {
                params,
                invoke: Box::new(handler),
            },
        );
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Parameter kinds of a registered method
    pub fn params(&self, name: &str) -> Option<&[ParamKind]> {
        self.resolve(name).map(Method::params)
    }

    /// Registered method names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("methods", &self.names())
            .finish()
    }
}
