/// Sanitises user-authored post content.
///
/// Whitelist based: formatting tags such as `<b>` and `<p>` survive,
/// `<script>` (with its body), `<iframe>` and event attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
