use std::sync::LazyLock;

use crate::models::Movie;

static SEED_MOVIES: LazyLock<Vec<Movie>> = LazyLock::new(|| {
    vec![
        seed(
            1,
            "Quantum Nexus",
            2024,
            "sci-fi",
            4.8,
            "142 min",
            "A physicist discovers a way to step between parallel timelines and must stop a \
             corporation from collapsing them into one.",
            "quantum-nexus",
        ),
        seed(
            2,
            "The Last Symphony",
            2023,
            "drama",
            4.7,
            "128 min",
            "An aging composer races against failing hearing to finish the piece that will \
             define his legacy.",
            "the-last-symphony",
        ),
        seed(
            3,
            "Shadow Protocol",
            2024,
            "action",
            4.5,
            "135 min",
            "A disavowed agent uncovers a conspiracy inside the agency that trained her.",
            "shadow-protocol",
        ),
        seed(
            4,
            "Cosmic Comedy Club",
            2023,
            "comedy",
            4.2,
            "98 min",
            "A washed-up comedian lands a residency at the only stand-up venue in the galaxy.",
            "cosmic-comedy-club",
        ),
        seed(
            5,
            "Digital Phantom",
            2024,
            "thriller",
            4.6,
            "118 min",
            "A security researcher is hunted by malware that seems to know her every move.",
            "digital-phantom",
        ),
        seed(
            6,
            "Neon Nights",
            2023,
            "action",
            4.4,
            "112 min",
            "A getaway driver takes one last job through a city that never turns its lights off.",
            "neon-nights",
        ),
    ]
});

/// The fixed fallback catalog, ids 1 through 6.
pub fn movies() -> &'static [Movie] {
    &SEED_MOVIES
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: i32,
    title: &str,
    year: i32,
    genre: &str,
    rating: f64,
    duration: &str,
    description: &str,
    slug: &str,
) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        year: Some(year),
        genre: genre.to_string(),
        rating: Some(rating),
        duration: Some(duration.to_string()),
        description: Some(description.to_string()),
        poster_url: Some(format!("https://images.marquee.dev/posters/{slug}.jpg")),
        trailer_url: Some(format!("https://images.marquee.dev/trailers/{slug}.mp4")),
        created_at: None,
        updated_at: None,
    }
}
