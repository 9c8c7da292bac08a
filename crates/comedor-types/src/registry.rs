//! Registry trait for self-registering implementations.
//!
//! Pluggable components (order stores, credential verifiers) each provide a
//! Registry struct implementing this trait, tying the name used in
//! configuration files to the factory that builds the implementation.

/// Base trait for implementation registries.
///
/// Every implementation module must declare the configuration name it is
/// selected by and the factory function that constructs it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this
	/// implementation, for example "memory" for
	/// `storage.implementations.memory`.
	const NAME: &'static str;

	/// The factory function type this implementation provides. Each
	/// component crate defines its own factory signature.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
