//! Anti-bot challenge page detection
//!
//! A challenge page is a response that was delivered but refuses service
//! (Cloudflare interstitials, captcha walls). It classifies as `blocked`,
//! never as a parse failure.
//!
//! Cloudflare also injects its challenge-platform script into ordinary pages,
//! so script-level markers only count on refusal statuses (403, 429, 503).
//! Any status is a challenge when an interstitial-only marker is present.

/// Markers that only appear on interstitial or captcha wall pages
const INTERSTITIAL_MARKERS: &[&str] = &[
    "<title>just a moment...</title>",
    "cf-browser-verification",
    "attention required! | cloudflare",
    "enable javascript and cookies to continue",
    "checking your browser before accessing",
    "please verify you are a human",
];

/// Markers that also show up on pages served normally
const SCRIPT_MARKERS: &[&str] = &["challenge-platform", "cf_chl_", "g-recaptcha", "h-captcha"];

/// True if the body looks like an anti-bot challenge
///
/// `refused` is set when the response status already denies service.
pub fn looks_like_challenge(body: &str, refused: bool) -> bool {
    // Markers sit near the top of the document
    let head: String = body.chars().take(20_000).collect::<String>().to_lowercase();
    if INTERSTITIAL_MARKERS.iter().any(|marker| head.contains(marker)) {
        return true;
    }
    refused && SCRIPT_MARKERS.iter().any(|marker| head.contains(marker))
}
