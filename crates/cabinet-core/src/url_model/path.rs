//! Path segment extraction from attachment URLs.

use percent_encoding::percent_decode_str;
use url::Url;

/// The last two non-empty path segments of `url`, percent-decoded.
///
/// Returns `None` when the path has fewer than two segments.
pub fn last_path_segments(url: &Url) -> Option<[String; 2]> {
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let [.., parent, file] = segments.as_slice() else {
        return None;
    };
    Some([decode(parent), decode(file)])
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
