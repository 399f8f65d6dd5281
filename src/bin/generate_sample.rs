use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Write a synthetic gzip-compressed listings export for local development.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "data/listings.csv.gz")]
    output: PathBuf,

    /// Number of listings to generate
    #[arg(short, long, default_value_t = 2000)]
    rows: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Neighbourhood name, centre latitude/longitude and typical nightly price.
const NEIGHBOURHOODS: [(&str, f64, f64, f64); 8] = [
    ("Centro", 40.4155, -3.7074, 120.0),
    ("Salamanca", 40.4300, -3.6800, 150.0),
    ("Chamberí", 40.4350, -3.7030, 110.0),
    ("Retiro", 40.4110, -3.6760, 95.0),
    ("Arganzuela", 40.4000, -3.6970, 80.0),
    ("Tetuán", 40.4600, -3.6980, 70.0),
    ("Latina", 40.4030, -3.7360, 60.0),
    ("Usera", 40.3850, -3.7070, 55.0),
];

const ROOM_TYPES: [(&str, f64); 4] = [
    ("Entire home/apt", 1.0),
    ("Private room", 0.45),
    ("Hotel room", 1.2),
    ("Shared room", 0.3),
];

const PROPERTY_TYPES: [&str; 4] = [
    "Entire rental unit",
    "Private room in rental unit",
    "Entire loft",
    "Room in boutique hotel",
];

const HEADER: [&str; 18] = [
    "id",
    "listing_url",
    "name",
    "host_id",
    "host_is_superhost",
    "neighbourhood",
    "neighbourhood_cleansed",
    "latitude",
    "longitude",
    "property_type",
    "room_type",
    "accommodates",
    "bathrooms_text",
    "bedrooms",
    "beds",
    "price",
    "number_of_reviews",
    "review_scores_rating",
];

/// `1234.0` → `"$1,234.00"`, the way listings exports format prices.
fn format_price(price: f64) -> String {
    let cents = format!("{price:.2}");
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.{frac}")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = csv::Writer::from_writer(GzEncoder::new(file, Compression::default()));
    writer.write_record(HEADER)?;

    for i in 0..args.rows {
        let id = 10_000 + i as u64;
        let (hood, lat, lon, base_price) = NEIGHBOURHOODS[(rng.next_u64() % 8) as usize];
        let (room, factor) = ROOM_TYPES[(rng.next_u64() % 4) as usize];
        let accommodates = 1 + rng.next_u64() % 6;
        let bedrooms = 1 + accommodates / 3;

        // Log-normal-ish prices with a thin tail of outliers.
        let mut price = (base_price * factor * rng.gauss(0.0, 0.35).exp()).max(10.0).round();
        if rng.chance(0.005) {
            price *= 40.0;
        }

        let superhost = if rng.chance(0.05) {
            ""
        } else if rng.chance(0.3) {
            "t"
        } else {
            "f"
        };
        let beds = if rng.chance(0.02) {
            String::new()
        } else {
            (bedrooms + rng.next_u64() % 2).to_string()
        };
        let rating = if rng.chance(0.1) {
            String::new()
        } else {
            format!("{:.2}", (4.0 + rng.next_f64()).min(5.0))
        };

        let record = [
            id.to_string(),
            format!("https://example.com/rooms/{id}"),
            format!("{} in {hood}", rng.pick(&["Cozy flat", "Bright studio", "Quiet room", "Loft"])),
            (1_000 + rng.next_u64() % 700).to_string(),
            superhost.to_string(),
            "Madrid, Comunidad de Madrid, Spain".to_string(),
            hood.to_string(),
            format!("{:.5}", lat + rng.gauss(0.0, 0.006)),
            format!("{:.5}", lon + rng.gauss(0.0, 0.006)),
            rng.pick(&PROPERTY_TYPES).to_string(),
            room.to_string(),
            accommodates.to_string(),
            rng.pick(&["1 bath", "1.5 baths", "2 baths", "1 shared bath"]).to_string(),
            bedrooms.to_string(),
            beds,
            format_price(price),
            (rng.next_u64() % 400).to_string(),
            rating,
        ];
        writer.write_record(&record)?;
    }

    let encoder = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv writer: {e}"))?;
    encoder.finish().context("finishing gzip stream")?;

    println!("Wrote {} listings to {}", args.rows, args.output.display());
    Ok(())
}
