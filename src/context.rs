// src/context.rs

//! Receiver binding for wrapped callbacks.
//!
//! A callback that needs an invocation context takes it as an explicit first parameter.
//! [`bind`] captures the context in the returned closure, so every invocation (immediate or
//! deferred) sees the same `Arc`, or `None` when no context was supplied.

// dependencies
use std::sync::Arc;

/// Bind an optional context to a callback, producing a callback over the arguments alone.
///
/// ```rust
/// use std::sync::Arc;
/// use flux_schedule::bind;
///
/// struct Canvas { id: u32 }
///
/// let canvas = Arc::new(Canvas { id: 7 });
/// let redraw = bind(Some(canvas), |canvas: Option<&Canvas>, (width, height): (u32, u32)| {
///     assert_eq!(canvas.map(|c| c.id), Some(7));
///     assert!(width > 0 && height > 0);
/// });
/// redraw((640, 480));
/// ```
pub fn bind<C, A, F>(context: Option<Arc<C>>, callback: F) -> impl Fn(A) + Send + Sync + 'static
where
    C: Send + Sync + 'static,
    A: 'static,
    F: Fn(Option<&C>, A) + Send + Sync + 'static,
{
    move |args| callback(context.as_deref(), args)
}

/// Same as `bind(None, callback)`: the callback sees `None` on every invocation.
pub fn unbound<C, A, F>(callback: F) -> impl Fn(A) + Send + Sync + 'static
where
    C: Send + Sync + 'static,
    A: 'static,
    F: Fn(Option<&C>, A) + Send + Sync + 'static,
{
    bind(None, callback)
}
