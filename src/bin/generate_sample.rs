use std::f64::consts::PI;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic labelled gesture recording in the grtool text format.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "sample_gestures.txt")]
    output: String,

    /// Recordings per gesture
    #[arg(short = 'n', long, default_value_t = 10)]
    per_class: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
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

    fn range(&mut self, lo: usize, hi: usize) -> usize {
        lo + (self.next_f64() * (hi - lo) as f64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Noise-free 2-D position of each gesture at phase `t` in `[0, 1]`.
fn trajectory(gesture: &str, t: f64) -> [f64; 2] {
    match gesture {
        "swipe" => [2.0 * t - 1.0, 0.1 * (PI * t).sin()],
        "circle" => [(2.0 * PI * t).cos(), (2.0 * PI * t).sin()],
        // a burst of shaking in the middle of the recording
        _ => [gaussian(t, 0.5, 0.15, 0.8) * (12.0 * PI * t).sin(), 0.0],
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let gestures = ["swipe", "circle", "shake"];

    let sink: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("could not create {}", args.output))?;
        Box::new(file)
    };
    let mut out = BufWriter::new(sink);

    writeln!(out, "# synthetic gestures: {}", gestures.join(", "))?;
    let mut recordings = 0;
    for _ in 0..args.per_class {
        for gesture in gestures {
            // Lengths vary so the file reads as time series data.
            let len = rng.range(20, 40);
            writeln!(out)?;
            for i in 0..len {
                let t = i as f64 / (len - 1) as f64;
                let [x, y] = trajectory(gesture, t);
                writeln!(
                    out,
                    "{gesture} {:.4} {:.4}",
                    x + rng.gauss(0.0, 0.02),
                    y + rng.gauss(0.0, 0.02)
                )?;
            }
            recordings += 1;
        }
    }
    out.flush()?;

    eprintln!(
        "Wrote {recordings} recordings ({} gestures) to {}",
        gestures.len(),
        args.output
    );
    Ok(())
}
