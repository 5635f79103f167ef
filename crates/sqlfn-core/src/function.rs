//! Type-erased host functions.
//!
//! A [`HostFunction`] pairs a [`FunctionType`] with a uniform adapter taking the
//! converted arguments as host values. Typed closures and `fn` items of up to
//! eight parameters become host functions through [`IntoHostFunction`]; script
//! loaders and other dynamic producers use [`HostFunction::dynamic`].
//!
//! ## Example
//!
//! ```
//! use sqlfn_core::{HostFunction, HostValue, Variadic};
//!
//! let add = HostFunction::new(|a: i32, b: i32| a + b);
//! assert_eq!(add.function_type().to_string(), "fn(i32, i32) -> i32");
//!
//! let sum = HostFunction::new(|prefix: String, rest: Variadic<i32>| {
//!     format!("{prefix}: {}", rest.iter().sum::<i32>())
//! });
//! assert!(sum.function_type().is_variadic());
//!
//! let out = add.call(vec![HostValue::Int32(2), HostValue::Int32(3)]).unwrap();
//! assert_eq!(out, HostValue::Int32(5));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::host_type::{FunctionType, HostType};
use crate::host_value::HostValue;
use crate::reflect::{FromHost, IntoHost, Reflect};

type Adapter = dyn Fn(Vec<HostValue>) -> Result<HostValue, ConversionError> + Send + Sync;

/// A host function with its type descriptor.
///
/// The adapter is shared through `Arc`, so clones are cheap and call the same
/// underlying closure.
pub struct HostFunction {
    ty: FunctionType,
    inner: Arc<Adapter>,
}

impl HostFunction {
    /// Wrap a typed closure or `fn` item.
    pub fn new<F, Args>(f: F) -> Self
    where
        F: IntoHostFunction<Args>,
    {
        f.into_host_function()
    }

    /// Wrap an adapter whose type is only known at runtime.
    ///
    /// The adapter receives one host value per formal parameter (the variadic
    /// tail packed into a single `Slice`) and returns the single result.
    pub fn dynamic<F>(ty: FunctionType, f: F) -> Self
    where
        F: Fn(Vec<HostValue>) -> Result<HostValue, ConversionError> + Send + Sync + 'static,
    {
        Self {
            ty,
            inner: Arc::new(f),
        }
    }

    pub fn function_type(&self) -> &FunctionType {
        &self.ty
    }

    /// This function's type as a [`HostType::Function`].
    pub fn host_type(&self) -> HostType {
        HostType::Function(self.ty.clone())
    }

    /// Call the adapter with already converted arguments.
    pub fn call(&self, args: Vec<HostValue>) -> Result<HostValue, ConversionError> {
        (self.inner)(args)
    }

    /// Clone this function, sharing the same adapter.
    pub fn clone_arc(&self) -> Self {
        Self {
            ty: self.ty.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Clone for HostFunction {
    fn clone(&self) -> Self {
        self.clone_arc()
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction")
            .field("ty", &self.ty.to_string())
            .finish_non_exhaustive()
    }
}

impl Reflect for HostFunction {
    fn host_type() -> HostType {
        HostType::Function(FunctionType::new(Vec::new(), Vec::new(), false))
    }
}

impl IntoHost for HostFunction {
    fn into_host(self) -> HostValue {
        HostValue::Function(self)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Return types of typed host functions.
///
/// Any [`Reflect`] + [`IntoHost`] type is a single result. `()` declares zero
/// results, which the signature deriver rejects.
pub trait FnResult {
    fn result_types() -> Vec<HostType>;

    fn into_result(self) -> HostValue;
}

impl<T: Reflect + IntoHost> FnResult for T {
    fn result_types() -> Vec<HostType> {
        vec![T::host_type()]
    }

    fn into_result(self) -> HostValue {
        self.into_host()
    }
}

impl FnResult for () {
    fn result_types() -> Vec<HostType> {
        Vec::new()
    }

    fn into_result(self) -> HostValue {
        HostValue::Nil
    }
}

// ============================================================================
// Typed closures
// ============================================================================

/// Conversion of a typed callable into a [`HostFunction`].
///
/// `Args` is a marker tuple of the parameter types so that one callable type
/// can only match one arity.
pub trait IntoHostFunction<Args> {
    fn into_host_function(self) -> HostFunction;
}

impl IntoHostFunction<HostFunction> for HostFunction {
    fn into_host_function(self) -> HostFunction {
        self
    }
}

fn next_arg(
    args: &mut std::vec::IntoIter<HostValue>,
    expected: usize,
    actual: usize,
) -> Result<HostValue, ConversionError> {
    args.next()
        .ok_or(ConversionError::Arity { expected, actual })
}

macro_rules! impl_into_host_function {
    ($($ty:ident $var:ident),*) => {
        impl<Func, Ret, $($ty,)*> IntoHostFunction<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret + Send + Sync + 'static,
            Ret: FnResult,
            $($ty: Reflect + FromHost,)*
        {
            #[allow(unused_mut, unused_variables)]
            fn into_host_function(self) -> HostFunction {
                let params = vec![$($ty::host_type()),*];
                let variadic = [$($ty::VARIADIC),*].last().copied().unwrap_or(false);
                let arity = params.len();
                let ty = FunctionType::new(params, Ret::result_types(), variadic);

                HostFunction::dynamic(ty, move |args: Vec<HostValue>| {
                    let actual = args.len();
                    if actual != arity {
                        return Err(ConversionError::Arity { expected: arity, actual });
                    }
                    let mut args = args.into_iter();
                    $(let $var = $ty::from_host(next_arg(&mut args, arity, actual)?)?;)*
                    Ok((self)($($var),*).into_result())
                })
            }
        }
    };
}

impl_into_host_function!();
impl_into_host_function!(A a);
impl_into_host_function!(A a, B b);
impl_into_host_function!(A a, B b, C c);
impl_into_host_function!(A a, B b, C c, D d);
impl_into_host_function!(A a, B b, C c, D d, E e);
impl_into_host_function!(A a, B b, C c, D d, E e, F f);
impl_into_host_function!(A a, B b, C c, D d, E e, F f, G g);
impl_into_host_function!(A a, B b, C c, D d, E e, F f, G g, H h);
