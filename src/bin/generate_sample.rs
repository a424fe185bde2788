//! Writes one synthetic run in every supported vendor layout.
//!
//! Usage: `generate_sample [DIR]` (defaults to `samples/`).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dyno_merge::data::normalize::CRANK_TORQUE_FACTOR;

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
}

/// `(rpm, hp, tq)` samples of a pull from 1500 to 6500 rpm, oldest first.
fn generate_pull(rng: &mut SimpleRng) -> Vec<(f64, f64, f64)> {
    (0..=50)
        .map(|i| {
            let rpm = 1500.0 + i as f64 * 100.0;
            // torque peaks around 4200 rpm
            let x = (rpm - 4200.0) / 2600.0;
            let tq = 14.5 * (1.0 - 0.45 * x * x) + rng.gauss(0.0, 0.08);
            let hp = tq * rpm / CRANK_TORQUE_FACTOR;
            (rpm, hp, tq)
        })
        .collect()
}

fn generic_csv(pull: &[(f64, f64, f64)]) -> Result<String> {
    let mut out = String::from("rpm,hp,tq\n");
    for (rpm, hp, tq) in pull {
        writeln!(out, "{rpm:.0},{hp:.2},{tq:.2}")?;
    }
    Ok(out)
}

/// Horacio Resio layout: 24 preamble lines, header, units, newest first.
fn pseudo_csv(pull: &[(f64, f64, f64)]) -> Result<Vec<u8>> {
    let mut out = String::new();
    let preamble = [
        "Horacio Resio - Dinamómetro de rodillos",
        "Versión 4.2",
        "Cliente: Taller Demostración",
        "Vehículo: Sedán 1.6",
        "Patente: AAA000",
        "Fecha: 12/03/2021",
        "Presión atmosférica: 1013 hPa",
        "Temperatura: 22 ºC",
        "Humedad relativa: 45 %",
        "Corrección: DIN 70020",
    ];
    for i in 0..24 {
        let line = preamble.get(i).copied().unwrap_or("");
        writeln!(out, "{line}")?;
    }
    out.push_str(
        "TIEMPO RPM_VEH RPM_ROD TORQUE POT_PER POT_CIGUE POT_RUEDA SENSOR AUX1 SENSOR AUX2\r\n",
    );
    out.push_str("s Rpm Rpm Kgm Cv Cv Cv\r\n");
    for (step, (rpm, hp, tq)) in pull.iter().enumerate().rev() {
        let wheel = hp * 0.85;
        write!(
            out,
            "{:.1} {rpm:.0} {:.0} {:.2} {:.2} {hp:.2} {wheel:.2} 0 0 0 0\r\n",
            step as f64 * 0.2,
            rpm * 0.31,
            tq,
            hp - wheel,
        )?;
    }
    Ok(latin1(&out))
}

/// `"v1, v2, ..."` as stored in a `Muestra` element.
fn sample_string(pull: &[(f64, f64, f64)], f: impl Fn(&(f64, f64, f64)) -> f64) -> String {
    pull.iter()
        .map(|s| format!("{:.2}", f(s)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// MWD layout: one `Ensayo` with a `CanalVirtual` per channel.
fn vendor_xml(pull: &[(f64, f64, f64)]) -> Result<Vec<u8>> {
    let channels = [
        ("RPM Motor", sample_string(pull, |s| s.0)),
        ("Torque Corr", sample_string(pull, |s| s.2)),
        ("Potencia Corr", sample_string(pull, |s| s.1)),
        ("Temperatura Admisión", sample_string(pull, |_| 31.0)),
    ];

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<Archivo>\n  <Ensayo>\n");
    for (name, samples) in channels {
        write!(
            out,
            "    <CanalVirtual>\n      <Nombre>{name}</Nombre>\n      <Muestra>{samples}</Muestra>\n    </CanalVirtual>\n"
        )?;
    }
    out.push_str("  </Ensayo>\n</Archivo>\n");
    Ok(latin1(&out))
}

/// The vendor software writes ISO-8859-1.
fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("samples"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let pull = generate_pull(&mut rng);

    write(&dir, "dyno_run.csv", generic_csv(&pull)?.as_bytes())?;
    write(&dir, "horacio_resio_sample.ine", &pseudo_csv(&pull)?)?;
    write(&dir, "mwd_sample.ad3", &vendor_xml(&pull)?)?;
    Ok(())
}
