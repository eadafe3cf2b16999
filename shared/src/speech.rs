//! SSML assembly and XML escaping for spoken responses.

/// Escape the five XML special characters for embedding in SSML.
pub fn escape_xml_characters(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap cleaned joke text in the SSML document handed to the synthesizer.
///
/// The text is Russian; the block carries a `ru-RU` language tag inside an
/// `x-loud` prosody wrapper.
pub fn joke_ssml(text: &str) -> String {
    format!(
        "<speak><prosody volume=\"x-loud\"><lang xml:lang=\"ru-RU\">{}</lang></prosody></speak>",
        escape_xml_characters(text)
    )
}

/// Audio playback tag for a pre-signed URL.
pub fn audio_tag(url: &str) -> String {
    format!("<audio src=\"{}\" />", escape_xml_characters(url))
}
