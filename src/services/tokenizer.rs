/// Prefix that places a genre filter in its own term namespace
pub const GENRE_PREFIX: &str = "genre=";

/// Prefix that places a cast filter in its own term namespace
pub const ACTOR_PREFIX: &str = "actor=";

/// Normalizes a genre or cast value the way catalog rows were ingested:
/// trimmed, lowercased, inner whitespace replaced by `-`
pub fn normalize_tag(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Turns structured filters into the query token list
///
/// Genres and actors are tagged so they never collide with a bare keyword of
/// the same text. Keywords are used verbatim. The list is then repeated once,
/// which doubles the term frequency of every token alike.
pub fn tokenize(genres: &[String], actors: &[String], keywords: &[String]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(2 * (genres.len() + actors.len() + keywords.len()));

    tokens.extend(
        genres
            .iter()
            .map(|g| format!("{GENRE_PREFIX}{}", normalize_tag(g))),
    );
    tokens.extend(
        actors
            .iter()
            .map(|a| format!("{ACTOR_PREFIX}{}", normalize_tag(a))),
    );
    tokens.extend(keywords.iter().cloned());

    let single = tokens.len();
    tokens.extend_from_within(..single);
    tokens
}
