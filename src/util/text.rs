use crate::error::Result;

fn trim_end_nulls_str(text: &str) -> &str {
	text.trim_end_matches('\0')
}

pub(crate) fn utf8_decode_str(bytes: &[u8]) -> Result<&str> {
	std::str::from_utf8(bytes)
		.map(trim_end_nulls_str)
		.map_err(Into::into)
}
