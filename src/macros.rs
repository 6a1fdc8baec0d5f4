macro_rules! try_vec {
	($elem:expr; $size:expr) => {{ $crate::util::alloc::fallible_vec_from_element($elem, $size)? }};
}

// Shorthand for return Err(ScanError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)          -> return Err(ScanError::new(ErrorKind::Variant))
// - err!(Variant(Message)) -> return Err(ScanError::new(ErrorKind::Variant(Message)))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::ScanError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($reason:literal)) => {
		return Err(crate::error::ScanError::new(
			crate::error::ErrorKind::$variant($reason),
		))
	};
}

// Shorthand for ErrorKind::FileDecoding("Message")
//
// Usage:
//
// - decode_err!(Message)
//
// or bail:
//
// - decode_err!(@BAIL Message)
macro_rules! decode_err {
	($reason:literal) => {
		crate::error::ScanError::new(crate::error::ErrorKind::FileDecoding($reason))
	};
	(@BAIL $reason:literal) => {
		return Err(decode_err!($reason))
	};
}

pub(crate) use {decode_err, err, try_vec};
