use ansi_term::Style;
use anyhow::{Context, Result};
use bpaf::Bpaf;
use log::*;
use serde::Serialize;
use std::io::{Read, Write};
use uncertain::SDouble;

/// Every column must be numeric.  Empty fields are skipped.
#[derive(Bpaf)]
pub struct Options {
    /// Write the summary as CSV instead of an aligned table
    csv: bool,
}

pub fn summarize(opts: Options) -> Result<()> {
    let columns = read_columns(std::io::stdin())?;
    let stdout = std::io::stdout();
    let stdout = stdout.lock();
    if opts.csv {
        write_csv(stdout, &columns)
    } else {
        write_table(stdout, &columns)
    }
}

/// Accumulates each column of the input into its own sample.
pub fn read_columns<R: Read>(input: R) -> Result<Vec<(String, SDouble)>> {
    let mut rdr = csv::Reader::from_reader(input);
    let mut columns = rdr
        .headers()?
        .iter()
        .map(|x| (x.to_string(), SDouble::new()))
        .collect::<Vec<_>>();
    for (idx, row) in rdr.into_records().enumerate() {
        let row = row?;
        for ((name, sample), field) in columns.iter_mut().zip(row.iter()) {
            let field = field.trim();
            if field.is_empty() {
                debug!("{}: no value on row {}", name, idx + 1);
                continue;
            }
            let x = field
                .parse::<f64>()
                .with_context(|| format!("{}: bad value {:?} on row {}", name, field, idx + 1))?;
            sample.push(x);
        }
    }
    info!("Read {} columns", columns.len());
    Ok(columns)
}

#[derive(Serialize)]
struct Row<'a> {
    column: &'a str,
    count: usize,
    mean: f64,
    error: f64,
    stddev: f64,
}

pub fn write_csv<W: Write>(out: W, columns: &[(String, SDouble)]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for (name, sample) in columns {
        wtr.serialize(Row {
            column: name,
            count: sample.count(),
            mean: sample.mean(),
            error: sample.standard_error_of_mean(),
            stddev: sample.standard_deviation(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table<W: Write>(out: W, columns: &[(String, SDouble)]) -> Result<()> {
    let mut out = tabwriter::TabWriter::new(out);
    writeln!(out, "column\tcount\tmean +- error\tstddev")?;
    for (name, sample) in columns {
        // A single observation has a mean but no error
        if sample.count() < 2 {
            warn!("{}: not enough data for an error estimate", name);
            writeln!(
                out,
                "{}\t{}\t{}",
                name,
                sample.count(),
                Style::new().dimmed().paint("insufficient data")
            )?;
        } else {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                name,
                sample.count(),
                sample,
                sample.standard_deviation()
            )?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "a,b,c\n1,10,5\n2,,5\n3,30,\n";

    #[test]
    fn columns() {
        let columns = read_columns(INPUT.as_bytes()).unwrap();
        let names = columns.iter().map(|x| x.0.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(columns[0].1.samples(), &[1., 2., 3.]);
        assert_eq!(columns[1].1.samples(), &[10., 30.]);
        assert_eq!(columns[2].1.mean(), 5.);
        assert_eq!(columns[2].1.error(), 0.);
    }

    #[test]
    fn bad_value() {
        let err = read_columns("a\n1\nx\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("bad value \"x\" on row 2"));
    }

    #[test]
    fn csv_output() {
        let columns = read_columns(INPUT.as_bytes()).unwrap();
        let mut out = vec![];
        write_csv(&mut out, &columns).unwrap();

        let mut rdr = csv::Reader::from_reader(out.as_slice());
        let headers = rdr.headers().unwrap().iter().collect::<Vec<_>>();
        assert_eq!(headers, vec!["column", "count", "mean", "error", "stddev"]);
        let rows = rdr.records().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "a");
        assert_eq!(&rows[0][1], "3");
        assert_eq!(rows[0][2].parse::<f64>().unwrap(), 2.);
        assert_eq!(rows[1][2].parse::<f64>().unwrap(), 20.);
        assert_eq!(rows[1][3].parse::<f64>().unwrap(), 10.);
    }

    #[test]
    fn table_output() {
        let columns = vec![
            ("x".to_string(), SDouble::from(vec![1., 3.])),
            ("y".to_string(), SDouble::from(vec![4.])),
        ];
        let mut out = vec![];
        write_table(&mut out, &columns).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("x "));
        assert!(lines[1].contains("2 +- 1"));
        assert!(lines[2].contains("insufficient data"));
    }
}
