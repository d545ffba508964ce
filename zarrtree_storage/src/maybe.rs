//! Thread-safety bounds that relax to nothing on `wasm32`.
//!
//! Store, codec and layout trait objects are shared across threads on native targets,
//! while `wasm32` builds may wrap single threaded handles.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    /// [`Send`] on native targets.
    pub trait MaybeSend: Send {}
    impl<T: Send + ?Sized> MaybeSend for T {}

    /// [`Sync`] on native targets.
    pub trait MaybeSync: Sync {}
    impl<T: Sync + ?Sized> MaybeSync for T {}
}

#[cfg(target_arch = "wasm32")]
mod native {
    /// No bound on `wasm32`.
    pub trait MaybeSend {}
    impl<T: ?Sized> MaybeSend for T {}

    /// No bound on `wasm32`.
    pub trait MaybeSync {}
    impl<T: ?Sized> MaybeSync for T {}
}

pub use native::{MaybeSend, MaybeSync};
