//! Pre-authored entries shipped with the binary.

use std::sync::LazyLock;

use cityscout_shared::LookupEntry;

static BUILTIN: LazyLock<Vec<LookupEntry>> = LazyLock::new(|| {
    vec![
        LookupEntry {
            city: "Paris".into(),
            summary: "Paris, the capital of France, is renowned for its art, fashion, gastronomy, and culture. Famous landmarks include the Eiffel Tower, Louvre Museum, Notre-Dame Cathedral, and Champs-Élysées. The city is known as the 'City of Light' and offers world-class cuisine, charming cafes, and romantic Seine River views.".into(),
            country: "France".into(),
            latitude: 48.8566,
            longitude: 2.3522,
        },
        LookupEntry {
            city: "Tokyo".into(),
            summary: "Tokyo, Japan's capital, blends traditional and modern life. It features ancient temples, imperial palaces, and cutting-edge technology. Famous areas include Shibuya, Shinjuku, Asakusa's Senso-ji Temple, and the Imperial Palace. The city is known for its efficient public transport, incredible food scene, and unique pop culture.".into(),
            country: "Japan".into(),
            latitude: 35.6762,
            longitude: 139.6503,
        },
        LookupEntry {
            city: "New York".into(),
            summary: "New York City, often called 'The Big Apple', is a global center of culture, finance, and entertainment. Iconic landmarks include the Statue of Liberty, Central Park, Times Square, and the Empire State Building. The city offers world-class museums, Broadway shows, diverse neighborhoods, and exceptional dining from around the world.".into(),
            country: "USA".into(),
            latitude: 40.7128,
            longitude: -74.0060,
        },
    ]
});

/// The built-in entries, initialized once per process.
pub fn builtin_entries() -> &'static [LookupEntry] {
    &BUILTIN
}
