//! Splitting via embedded MusicBrainz RDF
//!
//! Some taggers store a MusicBrainz metadata dump as XML/RDF in an
//! application block. The dialects in the wild are not well-formed XML, so
//! this is deliberately textual scraping rather than a strict parser.

use super::SplitContext;
use crate::scan::PEEM;
use crate::tag::{do_tag_mapping, TagMap};

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

macro_rules! pattern {
	($name:ident, $pattern:literal) => {
		fn $name() -> &'static Regex {
			static PATTERN: OnceLock<Regex> = OnceLock::new();
			PATTERN.get_or_init(|| Regex::new($pattern).unwrap())
		}
	};
}

pattern!(album_list, r"(?s)<mm:albumList>(.*?)</mm:albumList>");
pattern!(single_album, r#"<mm:Album\s+rdf:about="([^"]+)""#);
pattern!(resource_uri, r#"rdf:(?:resource|about)="([^"]+)""#);
pattern!(dc_title, r"(?s)<dc:title>\s*([^<]*?)\s*</dc:title>");
pattern!(dc_creator, r#"<dc:creator\s+rdf:resource="([^"]+)""#);
pattern!(release_date, r"(?s)<mm:ReleaseDate>.*?<dc:date>\s*([^<]*?)\s*</dc:date>");
pattern!(track_list, r"(?s)<mm:trackList>.*?<rdf:Seq>(.*?)</rdf:Seq>");
pattern!(artist_section, r#"(?s)<mm:Artist\s+rdf:about="([^"]+)">(.*?)</mm:Artist>"#);
pattern!(track_section, r#"(?s)<mm:Track\s+rdf:about="([^"]+)">(.*?)</mm:Track>"#);
pattern!(sort_name, r"(?s)<mm:sortName>\s*([^<]*?)\s*</mm:sortName>");
pattern!(four_digit_year, r"\d{4}");

pub(super) fn try_split(ctx: &mut SplitContext<'_>) -> usize {
	let Some(payload) = ctx.raw.applications.get(&PEEM) else {
		return 0;
	};

	let xml = String::from_utf8_lossy(payload);

	// An explicit album list, or a lone album
	let album_uris: Vec<String> = match album_list().captures(&xml) {
		Some(captures) => resource_uri()
			.captures_iter(&captures[1])
			.map(|c| c[1].to_owned())
			.collect(),
		None => match single_album().captures(&xml) {
			Some(captures) => vec![captures[1].to_owned()],
			None => return 0,
		},
	};

	if album_uris.is_empty() {
		return 0;
	}

	let artists = collect_artists(&xml);
	let track_titles = collect_track_titles(&xml);

	// Tracks are numbered across albums in list order; the running counter is
	// the cue sheet track index
	let mut cuesheet_track = 0u32;
	let mut count = 0;

	for album_uri in album_uris {
		let Some(section) = album_section(&xml, &album_uri) else {
			log::warn!("RDF album {album_uri} has no <mm:Album> section, skipping");
			continue;
		};

		let mut album_tags = TagMap::new();

		if let Some(captures) = dc_title().captures(&section) {
			album_tags.insert("ALBUM", &captures[1]);
		}
		if let Some(captures) = dc_creator().captures(&section) {
			album_tags.insert("ARTISTID", &captures[1]);
		}
		if let Some(captures) = release_date().captures(&section) {
			if let Some(year) = four_digit_year().find(&captures[1]) {
				album_tags.insert("YEAR", year.as_str());
			}
		}

		let track_uris: Vec<String> = match track_list().captures(&section) {
			Some(captures) => resource_uri()
				.captures_iter(&captures[1])
				.map(|c| c[1].to_owned())
				.collect(),
			None => Vec::new(),
		};

		for (position, track_uri) in track_uris.iter().enumerate() {
			cuesheet_track += 1;

			// Entries beyond the cue sheet's track table are skipped
			let Some(track) = ctx.tracks.get_mut(&cuesheet_track) else {
				continue;
			};

			track.insert("TRACKNUM", position as i64 + 1);

			if let Some(title) = track_titles.get(track_uri.as_str()) {
				track.insert_missing("TITLE", title.clone());
			}

			track.merge_missing(&album_tags);

			if let Some(artist_id) = track.get_text("ARTISTID").map(str::to_owned) {
				if let Some((artist, artist_sort)) = artists.get(artist_id.as_str()) {
					track.insert_missing("ARTIST", artist.clone());
					if let Some(artist_sort) = artist_sort {
						track.insert_missing("ARTISTSORT", artist_sort.clone());
					}
				}
			}

			track.merge_missing(&ctx.info_tags);
			do_tag_mapping(track);
			count += 1;
		}
	}

	count
}

fn album_section(xml: &str, uri: &str) -> Option<String> {
	let pattern = format!(
		r#"(?s)<mm:Album\s+rdf:about="{}">(.*?)</mm:Album>"#,
		regex::escape(uri)
	);

	Regex::new(&pattern)
		.ok()?
		.captures(xml)
		.map(|captures| captures[1].to_owned())
}

fn collect_artists(xml: &str) -> HashMap<String, (String, Option<String>)> {
	artist_section()
		.captures_iter(xml)
		.filter_map(|captures| {
			let uri = captures[1].to_owned();
			let section = &captures[2];

			let name = dc_title().captures(section)?[1].to_owned();
			let sort = sort_name()
				.captures(section)
				.map(|captures| captures[1].to_owned());

			Some((uri, (name, sort)))
		})
		.collect()
}

fn collect_track_titles(xml: &str) -> HashMap<String, String> {
	track_section()
		.captures_iter(xml)
		.filter_map(|captures| {
			let uri = captures[1].to_owned();
			let title = dc_title().captures(&captures[2])?[1].to_owned();

			Some((uri, title))
		})
		.collect()
}
