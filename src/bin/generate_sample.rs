use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dielectron_viewer::data::mass::invariant_mass;
use dielectron_viewer::data::model::FourMomentum;

const Z_MASS: f64 = 91.1876;
const Z_WIDTH: f64 = 2.4952;

/// Write a synthetic dielectron event table.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Output CSV path
    #[arg(default_value = "dielectron.csv")]
    output: PathBuf,

    /// Number of events
    #[arg(long, default_value_t = 20_000)]
    events: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Box-Muller transform for a normal deviate.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Pair mass: a Z peak on top of a falling Drell-Yan continuum.
fn sample_mass(rng: &mut StdRng) -> f64 {
    if rng.gen_bool(0.6) {
        gauss(rng, Z_MASS, Z_WIDTH / 2.0).max(2.0)
    } else {
        let u: f64 = rng.gen();
        2.0 - 15.0 * (1.0 - u * (1.0 - (-108.0f64 / 15.0).exp())).ln()
    }
}

/// Back-to-back massless electrons in the pair rest frame, boosted along z.
fn decay(rng: &mut StdRng, mass: f64) -> (FourMomentum, FourMomentum) {
    let cos_theta: f64 = rng.gen_range(-1.0..1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi: f64 = rng.gen_range(-PI..PI);
    let p = mass / 2.0;
    let (px, py, pz) = (p * sin_theta * phi.cos(), p * sin_theta * phi.sin(), p * cos_theta);

    let rapidity: f64 = rng.gen_range(-1.5..1.5);
    let (gamma, gamma_beta) = (rapidity.cosh(), rapidity.sinh());
    let boost = |e: f64, px: f64, py: f64, pz: f64| {
        FourMomentum::new(gamma * e + gamma_beta * pz, px, py, gamma * pz + gamma_beta * e)
    };
    (boost(p, px, py, pz), boost(p, -px, -py, -pz))
}

/// Independent resolution smearing of energy and momentum.
fn smear(rng: &mut StdRng, p: FourMomentum, resolution: f64) -> FourMomentum {
    let k = 1.0 + gauss(rng, 0.0, resolution);
    let e = p.e * (1.0 + gauss(rng, 0.0, resolution));
    FourMomentum::new(e, p.px * k, p.py * k, p.pz * k)
}

/// `E, px, py, pz, pt, eta, phi, Q` columns for one electron.
fn electron_fields(p: &FourMomentum, charge: i32) -> Vec<String> {
    let pt = p.px.hypot(p.py);
    let eta = (p.pz / pt).asinh();
    let phi = p.py.atan2(p.px);
    let mut fields: Vec<String> = [p.e, p.px, p.py, p.pz, pt, eta, phi]
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect();
    fields.push(charge.to_string());
    fields
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    // The public CMS dielectron table pads one header with a trailing space.
    writer.write_record([
        "Run", "Event", "E1", "px1 ", "py1", "pz1", "pt1", "eta1", "phi1", "Q1", "E2", "px2",
        "py2", "pz2", "pt2", "eta2", "phi2", "Q2", "M",
    ])?;

    let run = 147115;
    let mut non_physical = 0;
    for i in 0..args.events {
        let mass = sample_mass(&mut rng);
        let (true1, true2) = decay(&mut rng, mass);
        let mut e1 = smear(&mut rng, true1, 0.01);
        let e2 = smear(&mut rng, true2, 0.01);

        // A small fraction of mis-measured energies.
        if rng.gen_bool(0.01) {
            e1.e *= 0.1;
        }
        if invariant_mass(e1.e, e2.e, e1.px, e2.px, e1.py, e2.py, e1.pz, e2.pz).is_err() {
            non_physical += 1;
        }

        let recorded = gauss(&mut rng, mass, 0.3).max(0.0);
        let m_field = if rng.gen_bool(0.005) {
            String::new()
        } else {
            format!("{recorded:.5}")
        };

        let q1 = if rng.gen_bool(0.5) { 1 } else { -1 };
        let mut record = vec![run.to_string(), (366_000_000 + i).to_string()];
        record.extend(electron_fields(&e1, q1));
        record.extend(electron_fields(&e2, -q1));
        record.push(m_field);
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} events ({non_physical} non-physical) to {}",
        args.events,
        args.output.display()
    );
    Ok(())
}
