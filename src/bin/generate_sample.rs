//! Writes `sample_data.csv` and `sample_data.xlsx`: a small sales table with
//! a few duplicated rows and some empty cells, handy for trying the cleaner.

use anyhow::{Context, Result};
use data_sweeper::data::codec::encode;
use data_sweeper::{CodecOptions, Column, ConversionTarget, Table, Value};

/// Deterministic splitmix64, enough for sample data.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SampleRng(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];

    let mut region = Vec::new();
    let mut product = Vec::new();
    let mut units = Vec::new();
    let mut price = Vec::new();
    let mut promo = Vec::new();

    for _ in 0..40 {
        region.push(Value::Text(rng.pick(&regions).to_string()));
        product.push(Value::Text(rng.pick(&products).to_string()));
        // Roughly one in eight numeric cells is left empty.
        units.push(if rng.next_f64() < 0.125 {
            Value::Missing
        } else {
            Value::Float((rng.next_u64() % 200) as f64)
        });
        price.push(if rng.next_f64() < 0.125 {
            Value::Missing
        } else {
            Value::Float((rng.next_f64() * 5000.0).round() / 100.0)
        });
        promo.push(Value::Bool(rng.next_f64() < 0.3));
    }

    // Repeat a handful of rows verbatim.
    for row in [3usize, 7, 7, 21] {
        for col in [&mut region, &mut product, &mut units, &mut price, &mut promo] {
            let v = col[row].clone();
            col.push(v);
        }
    }

    let table = Table::new(vec![
        Column::new("region", region),
        Column::new("product", product),
        Column::new("units", units),
        Column::new("price", price),
        Column::new("promo", promo),
    ])
    .context("building sample table")?;

    let options = CodecOptions::default();
    for (target, path) in [
        (ConversionTarget::Csv, "sample_data.csv"),
        (ConversionTarget::Excel, "sample_data.xlsx"),
    ] {
        let bytes = encode(&table, target, &options).with_context(|| format!("encoding {path}"))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {path}"))?;
        println!("Wrote {} rows to {path}", table.row_count());
    }

    Ok(())
}
