use std::cell::UnsafeCell;

thread_local! {
	static GLOBAL_OPTIONS: UnsafeCell<GlobalOptions> = UnsafeCell::new(GlobalOptions::from_env());
}

pub(crate) unsafe fn global_options() -> &'static GlobalOptions {
	GLOBAL_OPTIONS.with(|global_options| unsafe { &*global_options.get() })
}

/// Options that control all interactions with flacscan for the current thread
///
/// # Examples
///
/// ```rust
/// use flacscan::config::{apply_global_options, GlobalOptions};
///
/// // A headless scanner that never serves images
/// let global_options = GlobalOptions::new().suppress_artwork(true);
/// apply_global_options(global_options);
/// ```
#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
#[non_exhaustive]
pub struct GlobalOptions {
	pub(crate) suppress_artwork: bool,
	pub(crate) allocation_limit: usize,
}

impl GlobalOptions {
	/// Default allocation limit for any single tag item
	pub const DEFAULT_ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

	/// The environment variable controlling the default of [`GlobalOptions::suppress_artwork`]
	pub const NO_ARTWORK_ENV: &'static str = "AUDIO_SCAN_NO_ARTWORK";

	/// Creates a new `GlobalOptions`
	///
	/// Unlike [`GlobalOptions::default`], this ignores the environment.
	///
	/// # Examples
	///
	/// ```rust
	/// use flacscan::config::GlobalOptions;
	///
	/// let global_options = GlobalOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			suppress_artwork: false,
			allocation_limit: Self::DEFAULT_ALLOCATION_LIMIT,
		}
	}

	/// Creates a `GlobalOptions` seeded from the environment
	///
	/// `suppress_artwork` is enabled when [`GlobalOptions::NO_ARTWORK_ENV`] is set to
	/// anything other than `"0"` or the empty string.
	#[must_use]
	pub fn from_env() -> Self {
		let suppress_artwork = match std::env::var(Self::NO_ARTWORK_ENV) {
			Ok(value) => !value.is_empty() && value != "0",
			Err(_) => false,
		};

		Self {
			suppress_artwork,
			..Self::new()
		}
	}

	/// Whether to replace artwork bytes with their length
	///
	/// When enabled, resolved cover art is dropped after measuring and the `ARTWORK`
	/// tag carries the byte count instead of the image itself. `COVER_LENGTH` is the
	/// same in either mode.
	///
	/// # Examples
	///
	/// ```rust
	/// use flacscan::config::{apply_global_options, GlobalOptions};
	///
	/// // We only need to know artwork sizes
	/// let global_options = GlobalOptions::new().suppress_artwork(true);
	/// apply_global_options(global_options);
	/// ```
	pub fn suppress_artwork(&mut self, suppress_artwork: bool) -> Self {
		self.suppress_artwork = suppress_artwork;
		*self
	}

	/// The maximum number of bytes to allocate for any single tag item
	///
	/// This is a safety measure to prevent allocating too much memory for a single tag item.
	/// If a tag item exceeds this limit, the allocator will return
	/// [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData).
	///
	/// # Examples
	///
	/// ```rust
	/// use flacscan::config::{apply_global_options, GlobalOptions};
	///
	/// // I have files with gigantic images, I'll double the allocation limit!
	/// let global_options = GlobalOptions::new().allocation_limit(32 * 1024 * 1024);
	/// apply_global_options(global_options);
	/// ```
	pub fn allocation_limit(&mut self, allocation_limit: usize) -> Self {
		self.allocation_limit = allocation_limit;
		*self
	}
}

impl Default for GlobalOptions {
	/// The default implementation for `GlobalOptions`, seeded from the environment
	///
	/// See [`GlobalOptions::from_env`]
	fn default() -> Self {
		Self::from_env()
	}
}

/// Applies the given `GlobalOptions` to the current thread
///
/// # Examples
///
/// ```rust
/// use flacscan::config::{apply_global_options, GlobalOptions};
///
/// let global_options = GlobalOptions::new().suppress_artwork(true);
/// apply_global_options(global_options);
/// ```
pub fn apply_global_options(options: GlobalOptions) {
	GLOBAL_OPTIONS.with(|global_options| unsafe {
		*global_options.get() = options;
	});
}
