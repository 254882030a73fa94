//! Merge looked-up fields into a file's metadata

use crate::lookup::Enrichment;
use crate::metadata::TrackMetadata;

/// Apply every non-empty enrichment field, keeping existing values otherwise
pub fn merge(meta: &mut TrackMetadata, enrichment: &Enrichment) {
    for (field, value) in [
        (&mut meta.album, &enrichment.album),
        (&mut meta.year, &enrichment.year),
        (&mut meta.genre, &enrichment.genre),
    ] {
        if !value.is_empty() {
            field.clone_from(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_fields_override() {
        let mut meta = TrackMetadata {
            artist: "Daft Punk".to_string(),
            title: "One More Time".to_string(),
            album: "Old Album".to_string(),
            year: "1999".to_string(),
            genre: "House".to_string(),
            ..Default::default()
        };
        let enrichment = Enrichment {
            album: "Discovery".to_string(),
            year: String::new(),
            genre: "Electronic".to_string(),
        };

        merge(&mut meta, &enrichment);

        assert_eq!(meta.album, "Discovery");
        assert_eq!(meta.year, "1999");
        assert_eq!(meta.genre, "Electronic");
        assert_eq!(meta.artist, "Daft Punk");
    }

    #[test]
    fn test_empty_enrichment_changes_nothing() {
        let mut meta = TrackMetadata::default();
        let before = meta.clone();
        merge(&mut meta, &Enrichment::default());
        assert_eq!(meta, before);
    }
}
