use anime_providers::filter::FilterCapabilities;
use anime_providers::media::{EpisodeNumber, InfoResult, SearchResult, StreamRendition};
use colored::{Color, Colorize};
use serde::Serialize;

/// Renders command results either as colored text or as JSON.
pub struct OutputManager {
    json: bool,
}

#[derive(Serialize)]
struct ProviderRow<'a> {
    name: &'a str,
    filters: Vec<&'static str>,
}

impl OutputManager {
    pub fn new(json: bool, colored: bool) -> Self {
        if !colored {
            colored::control::set_override(false);
        }
        Self { json }
    }

    pub fn format_providers(
        &self,
        providers: &[(&str, FilterCapabilities)],
    ) -> anyhow::Result<String> {
        let rows: Vec<ProviderRow<'_>> = providers
            .iter()
            .map(|(name, caps)| ProviderRow {
                name,
                filters: caps.iter_names().map(|(flag, _)| flag).collect(),
            })
            .collect();
        if self.json {
            return self.to_json(&rows);
        }

        let mut output = String::new();
        for row in rows {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize(row.name, Color::Green, true),
                row.filters.join(", ")
            ));
        }
        Ok(output)
    }

    pub fn format_search(&self, results: &[SearchResult]) -> anyhow::Result<String> {
        if self.json {
            return self.to_json(results);
        }

        let mut output = String::new();
        output.push_str(&self.colorize(&format!("{} results", results.len()), Color::Green, true));
        output.push('\n');
        for (index, result) in results.iter().enumerate() {
            let languages: Vec<String> = result.languages.iter().map(ToString::to_string).collect();
            output.push_str(&format!(
                "{:>3}. {} {} [{}]\n",
                index + 1,
                self.colorize(result.name.as_deref().unwrap_or("<untitled>"), Color::Cyan, false),
                self.colorize(&result.identifier, Color::Yellow, false),
                languages.join("/")
            ));
        }
        Ok(output)
    }

    pub fn format_episodes(&self, episodes: &[EpisodeNumber]) -> anyhow::Result<String> {
        if self.json {
            return self.to_json(episodes);
        }
        let list: Vec<String> = episodes.iter().map(ToString::to_string).collect();
        Ok(format!(
            "{} {}\n",
            self.colorize(&format!("{} episodes:", episodes.len()), Color::Green, true),
            list.join(" ")
        ))
    }

    pub fn format_info(&self, info: &InfoResult) -> anyhow::Result<String> {
        if self.json {
            return self.to_json(info);
        }

        let mut output = String::new();
        let mut field = |label: &str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                output.push_str(&format!(
                    "  {}: {}\n",
                    self.colorize(label, Color::Yellow, false),
                    self.colorize(&value, Color::Cyan, false)
                ));
            }
        };
        field("Name", info.name.clone());
        field("Alternative names", Some(info.alternative_names.join("; ")));
        field("Status", info.status.map(|s| s.to_string()));
        field("Year", info.release_year.map(|y| y.to_string()));
        field("Genres", Some(info.genres.join(", ")));
        field("Image", info.image.clone());
        field("Synopsis", info.synopsis.clone());
        Ok(output)
    }

    pub fn format_streams(&self, streams: &[StreamRendition]) -> anyhow::Result<String> {
        if self.json {
            return self.to_json(streams);
        }

        let mut output = String::new();
        for stream in streams {
            output.push_str(&format!(
                "{} {}\n",
                self.colorize(&format!("{:>5}p", stream.resolution), Color::Green, true),
                self.colorize(&stream.url, Color::Blue, false)
            ));
            if let Some(referrer) = &stream.referrer {
                output.push_str(&format!(
                    "       {}: {}\n",
                    self.colorize("Referer", Color::Yellow, false),
                    referrer
                ));
            }
            if let Some(subtitles) = &stream.subtitles {
                let mut labels: Vec<&str> = subtitles.keys().map(String::as_str).collect();
                labels.sort_unstable();
                output.push_str(&format!(
                    "       {}: {}\n",
                    self.colorize("Subtitles", Color::Yellow, false),
                    labels.join(", ")
                ));
            }
        }
        Ok(output)
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn colorize(&self, text: &str, color: Color, bold: bool) -> String {
        let colored = text.color(color);
        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }
}
