use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const TEAMS: [&str; 12] = [
    "Giants", "Tigers", "Dragons", "Swallows", "Carp", "BayStars",
    "Hawks", "Lions", "Marines", "Eagles", "Fighters", "Buffaloes",
];

/// Position and its share of a 28-man roster.
const POSITIONS: [(&str, usize); 4] = [
    ("Pitcher", 13),
    ("Catcher", 3),
    ("Infielder", 7),
    ("Outfielder", 5),
];

const SURNAMES: [&str; 16] = [
    "Sato", "Suzuki", "Takahashi", "Tanaka", "Ito", "Watanabe", "Yamamoto", "Nakamura",
    "Kobayashi", "Kato", "Yoshida", "Yamada", "Sasaki", "Yamaguchi", "Matsumoto", "Inoue",
];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Salary in units of 10,000 yen: log-normal around ~3,000 with a long tail.
fn draw_salary(rng: &mut SimpleRng) -> i64 {
    let v = rng.gauss(8.0, 0.9).exp();
    (v.clamp(440.0, 90_000.0) / 10.0).round() as i64 * 10
}

/// `12345` → `"12,345万円"`
fn format_salary(v: i64) -> String {
    let digits = v.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push_str("万円");
    out
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut names: Vec<String> = Vec::new();
    let mut teams: Vec<String> = Vec::new();
    let mut positions: Vec<String> = Vec::new();
    let mut salaries: Vec<Option<String>> = Vec::new();
    let mut ages: Vec<i64> = Vec::new();

    for team in TEAMS {
        for (position, count) in POSITIONS {
            for _ in 0..count {
                let surname = rng.pick(&SURNAMES);
                names.push(format!("{surname} {}", names.len() + 1));
                teams.push(team.to_string());
                positions.push(position.to_string());
                ages.push(19 + (rng.next_u64() % 20) as i64);

                // A few unparseable / missing salaries, as real sheets have.
                let roll = rng.next_f64();
                salaries.push(if roll < 0.01 {
                    None
                } else if roll < 0.02 {
                    Some("undisclosed".to_string())
                } else {
                    Some(format_salary(draw_salary(&mut rng)))
                });
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Player Name", DataType::Utf8, false),
        Field::new("Team", DataType::Utf8, false),
        Field::new("Position", DataType::Utf8, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Salary (10k JPY)", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(names.clone())),
            Arc::new(StringArray::from(teams.clone())),
            Arc::new(StringArray::from(positions.clone())),
            Arc::new(Int64Array::from(ages.clone())),
            Arc::new(StringArray::from(salaries.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_salaries.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer =
        ArrowWriter::try_new(file, schema.clone(), None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Write CSV with the same columns
    let csv_path = "sample_salaries.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    let header: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    csv_writer.write_record(&header).expect("Failed to write CSV header");
    for i in 0..names.len() {
        let age = ages[i].to_string();
        csv_writer
            .write_record([
                names[i].as_str(),
                teams[i].as_str(),
                positions[i].as_str(),
                age.as_str(),
                salaries[i].as_deref().unwrap_or(""),
            ])
            .expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    println!(
        "Wrote {} players ({} teams) to {parquet_path} and {csv_path}",
        names.len(),
        TEAMS.len()
    );
}
