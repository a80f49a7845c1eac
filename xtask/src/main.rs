use anyhow::{anyhow, bail, Context, Result};
use emg_dsp::fft::{self, Complex};
use emg_dsp::kernel::KernelLifecycle;
use emg_dsp::signal::snr::{snr_report, DEFAULT_KAISER_BETA};
use emg_dsp::signal::spectral::{
    periodogram, Direction, FftConfig, FftKernel, PeriodogramConfig, PeriodogramKernel,
};
use emg_dsp::signal::traits::{Periodogram1D, Transform1D, WindowGenerate};
use emg_dsp::signal::windows::{kaiser, KaiserConfig, KaiserKernel};
use emg_dsp::special::{bessel_i, bessel_i0};
use emg_dsp::stats::SpectrumSummary;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PYTHON_BIN: &str = "python3";
const DEFAULT_FS: f64 = 1000.0;

const PY_SIGNAL_SCRIPT: &str = r#"
import json
import sys
import time
import numpy as np
import scipy
import scipy.signal
import scipy.special

env = json.loads(sys.stdin.read())
op = env["op"]
iters = int(env["iters"])
p = env["payload"]

def _as_array(key):
    return np.asarray(p[key], dtype=float)

def _split(z):
    z = np.asarray(z, dtype=complex)
    return np.concatenate([z.real, z.imag])

def _compute():
    if op == "fft":
        return _split(np.fft.fft(_as_array("re") + 1j * _as_array("im")))
    if op == "ifft":
        return _split(np.fft.ifft(_as_array("re") + 1j * _as_array("im")))
    if op == "convolve":
        a = np.fft.fft(_as_array("a"))
        b = np.fft.fft(_as_array("b"))
        return _split(np.fft.ifft(a * b))
    if op == "kaiser":
        return np.kaiser(int(p["len"]), float(p["beta"]))
    if op == "i0":
        return scipy.special.i0(_as_array("x"))
    if op == "iv":
        return scipy.special.iv(float(p["order"]), _as_array("x"))
    if op == "periodogram":
        x = _as_array("x")
        w = np.kaiser(len(x), float(p["beta"]))
        _, pxx = scipy.signal.periodogram(
            x, fs=float(p["fs"]), window=w, detrend=False, scaling="density"
        )
        return pxx
    raise ValueError(f"unknown op: {op}")

y = _compute()

t0 = time.perf_counter_ns()
for _ in range(iters):
    _compute()
t1 = time.perf_counter_ns()

print(json.dumps({
    "output": np.asarray(y, dtype=float).tolist(),
    "avg_ns": (t1 - t0) / max(iters, 1),
    "python_version": sys.version.split()[0],
    "numpy_version": np.__version__,
    "scipy_version": scipy.__version__
}))
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct PythonEval {
    output: Vec<f64>,
    avg_ns: f64,
    python_version: String,
    numpy_version: String,
    scipy_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ContractRow {
    case_id: String,
    pearson_r: f64,
    mae: f64,
    rmse: f64,
    max_abs: f64,
    max_rel: f64,
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
    speedup_vs_baseline: f64,
    speedup_vs_python: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContractBundle {
    generated_epoch_seconds: u64,
    python_executable: String,
    python_version: String,
    numpy_version: String,
    scipy_version: String,
    rows: Vec<ContractRow>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("contracts") => run_contracts(),
        Some("analyze") => {
            let (path, fs) = parse_analyze_args(args)?;
            run_analyze(&path, fs)
        }
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- analyze <samples.txt> [--fs <hz>]");
            eprintln!("  cargo run -p xtask -- contracts");
            Ok(())
        }
    }
}

fn parse_analyze_args(mut args: impl Iterator<Item = String>) -> Result<(PathBuf, f64)> {
    let mut path = None;
    let mut fs = DEFAULT_FS;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fs" => {
                let value = args.next().context("--fs needs a value")?;
                fs = value
                    .parse()
                    .with_context(|| format!("parsing sample rate `{value}`"))?;
            }
            other if path.is_none() => path = Some(PathBuf::from(other)),
            other => bail!("unexpected argument `{other}`"),
        }
    }
    let path = path.context("analyze needs a sample file")?;
    Ok((path, fs))
}

/// Sample files hold one value per line. Only lines that are entirely an
/// optionally negative decimal number (`-?\d+(\.\d+)?`) count; headers,
/// blank lines and anything else are skipped. After trimming surrounding
/// whitespace, exactly the strings that pattern matches are accepted.
fn parse_sample(line: &str) -> Option<f64> {
    let line = line.trim();
    let digits = line.strip_prefix('-').unwrap_or(line);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int) || !frac.is_none_or(all_digits) {
        return None;
    }
    line.parse().ok()
}

fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let total = text.lines().count();
    let samples = text.lines().filter_map(parse_sample).collect::<Vec<_>>();
    if samples.len() < total {
        debug!(skipped = total - samples.len(), "ignored non-numeric lines");
    }
    Ok(samples)
}

fn run_analyze(path: &Path, fs: f64) -> Result<()> {
    let samples = read_samples(path)?;
    info!(samples = samples.len(), fs, file = %path.display(), "analyzing");
    if samples.is_empty() {
        bail!("{} holds no numeric samples", path.display());
    }

    let report = snr_report(&samples, fs).map_err(|e| anyhow!("snr estimation failed: {e}"))?;
    let summary = SpectrumSummary::from_samples(&samples, fs)
        .map_err(|e| anyhow!("spectrum summary failed: {e}"))?;
    if report.snr_db.is_nan() {
        warn!("no measurable tone; SNR is undefined");
    }

    let harmonics = report
        .harmonics
        .iter()
        .map(|h| json!({ "frequency": h.frequency, "power": h.power }))
        .collect::<Vec<_>>();
    let out = json!({
        "file": path.display().to_string(),
        "samples": samples.len(),
        "fs": fs,
        "snr_db": report.snr_db,
        "fundamental_frequency": report.fundamental_frequency,
        "fundamental_power": report.fundamental_power,
        "noise_power": report.noise_power,
        "noise_density": report.noise_density,
        "harmonics": harmonics,
        "mean_frequency": summary.mean_frequency,
        "median_frequency": summary.median_frequency,
        "max_db": summary.max_db,
        "max_db_frequency": summary.max_db_frequency,
        "min_db": summary.min_db,
        "min_db_frequency": summary.min_db_frequency,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serializing analysis report")?
    );
    Ok(())
}

fn run_contracts() -> Result<()> {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let out_dir = PathBuf::from(format!("target/contracts/{ts}"));
    fs::create_dir_all(&out_dir).context("creating contract output directory")?;

    let python_bin = detect_python_bin();
    let mut rows = Vec::new();

    // Shared synthetic recording: a 50 Hz tone, a weaker 120 Hz tone and a
    // deterministic wobble standing in for noise.
    let fs = DEFAULT_FS;
    let signal: Vec<f64> = (0..1000)
        .map(|i| {
            let t = i as f64 / fs;
            (2.0 * std::f64::consts::PI * 50.0 * t).sin()
                + 0.25 * (2.0 * std::f64::consts::PI * 120.0 * t).cos()
                + 0.05 * (37.0 * t * t).sin()
        })
        .collect();

    // Forward transform, both dispatch paths.
    for n in [1024usize, 1000, 997] {
        let case_id = format!("fft_forward_{n}");
        let x = signal
            .iter()
            .cycle()
            .take(n)
            .enumerate()
            .map(|(i, re)| Complex::new(*re, 0.1 * (i as f64 / 9.0).cos()))
            .collect::<Vec<_>>();
        let kernel = FftKernel::try_new(FftConfig::default())?;

        let candidate = kernel
            .run_alloc(x.as_slice())
            .map_err(|e| anyhow!("fft candidate execution failed: {e}"))?;
        let baseline = fft::transform(&x)?;
        let py = python_signal_eval(
            &python_bin,
            "fft",
            json!({ "re": fft::real_parts(&x), "im": fft::imag_parts(&x) }),
            50,
        )?;
        let candidate_ns = benchmark_avg_ns(50, || {
            kernel
                .run_alloc(x.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("fft candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(50, || {
            fft::transform(&x)?;
            Ok(())
        })?;
        record_case(
            &mut rows,
            &case_id,
            split_complex(&candidate),
            split_complex(&baseline),
            py,
            candidate_ns,
            baseline_ns,
        )?;
    }

    // Inverse transform.
    {
        let case_id = "fft_inverse_600";
        let x = fft::to_complex(&signal[..600]);
        let candidate = fft::inverse_transform(&x)?;
        let baseline = FftKernel::try_new(FftConfig {
            direction: Direction::Inverse,
        })?
        .run_alloc(x.as_slice())
        .map_err(|e| anyhow!("inverse kernel failed: {e}"))?;
        let py = python_signal_eval(
            &python_bin,
            "ifft",
            json!({ "re": fft::real_parts(&x), "im": fft::imag_parts(&x) }),
            50,
        )?;
        let candidate_ns = benchmark_avg_ns(50, || {
            fft::inverse_transform(&x)?;
            Ok(())
        })?;
        record_case(
            &mut rows,
            case_id,
            split_complex(&candidate),
            split_complex(&baseline),
            py,
            candidate_ns,
            candidate_ns,
        )?;
    }

    // Circular convolution.
    {
        let case_id = "convolve_circular_300";
        let a = signal[..300].to_vec();
        let b = (0..300)
            .map(|i| {
                let x = (i as f64 - 150.0) / 12.0;
                (-(x * x) / 2.0).exp()
            })
            .collect::<Vec<_>>();
        let (ca, cb) = (fft::to_complex(&a), fft::to_complex(&b));
        let candidate = fft::convolve(&ca, &cb)?;
        let py = python_signal_eval(&python_bin, "convolve", json!({ "a": a, "b": b }), 50)?;
        let candidate_ns = benchmark_avg_ns(50, || {
            fft::convolve(&ca, &cb)?;
            Ok(())
        })?;
        let candidate = split_complex(&candidate);
        record_case(
            &mut rows,
            case_id,
            candidate.clone(),
            candidate,
            py,
            candidate_ns,
            candidate_ns,
        )?;
    }

    // Kaiser windows.
    for (len, beta) in [(64usize, 8.6), (1000, DEFAULT_KAISER_BETA), (33, 0.5)] {
        let case_id = format!("kaiser_{len}_beta{beta}");
        let kernel = KaiserKernel::try_new(KaiserConfig { len, beta })?;
        let candidate = kernel
            .run_alloc()
            .map_err(|e| anyhow!("kaiser candidate execution failed: {e}"))?;
        let baseline = kaiser(len, beta)?;
        let py = python_signal_eval(
            &python_bin,
            "kaiser",
            json!({ "len": len, "beta": beta }),
            50,
        )?;
        let candidate_ns = benchmark_avg_ns(50, || {
            kernel
                .run_alloc()
                .map(|_| ())
                .map_err(|e| anyhow!("kaiser candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(50, || {
            kaiser(len, beta)?;
            Ok(())
        })?;
        record_case(
            &mut rows,
            &case_id,
            candidate,
            baseline,
            py,
            candidate_ns,
            baseline_ns,
        )?;
    }

    // Bessel I0 over both evaluation branches, up to the overflow bound.
    {
        let case_id = "bessel_i0_grid";
        let x = [0.0, 1e-6, 5e-5, 1e-4, 0.5, 1.0, 2.5, 10.0, 38.0, 100.0, 300.0, 700.0];
        let candidate = x.iter().map(|&x| bessel_i0(x)).collect::<Result<Vec<_>, _>>()?;
        let baseline = x
            .iter()
            .map(|&x| bessel_i(0.0, x))
            .collect::<Result<Vec<_>, _>>()?;
        let py = python_signal_eval(&python_bin, "i0", json!({ "x": x }), 200)?;
        let candidate_ns = benchmark_avg_ns(200, || {
            for &v in &x {
                bessel_i0(v)?;
            }
            Ok(())
        })?;
        record_case(
            &mut rows,
            case_id,
            candidate,
            baseline,
            py,
            candidate_ns,
            candidate_ns,
        )?;
    }

    // Higher integer orders.
    for order in [1u32, 3, 10] {
        let case_id = format!("bessel_i{order}_grid");
        let x = [1e-3, 0.5, 2.0, 7.5, 20.0, 60.0, 200.0];
        let candidate = x
            .iter()
            .map(|&x| bessel_i(order as f64, x))
            .collect::<Result<Vec<_>, _>>()?;
        let py = python_signal_eval(&python_bin, "iv", json!({ "order": order, "x": x }), 200)?;
        let candidate_ns = benchmark_avg_ns(200, || {
            for &v in &x {
                bessel_i(order as f64, v)?;
            }
            Ok(())
        })?;
        record_case(
            &mut rows,
            &case_id,
            candidate.clone(),
            candidate,
            py,
            candidate_ns,
            candidate_ns,
        )?;
    }

    // Kaiser-windowed periodogram. Even length: the one-sided fold only
    // agrees with SciPy's at DC for even lengths.
    {
        let case_id = "periodogram_kaiser38_1000";
        let kernel = PeriodogramKernel::try_new(PeriodogramConfig {
            fs,
            beta: DEFAULT_KAISER_BETA,
        })?;
        let (_, candidate) = kernel
            .run_alloc(signal.as_slice())
            .map_err(|e| anyhow!("periodogram candidate execution failed: {e}"))?;
        let (_, baseline) = periodogram(&signal, fs, DEFAULT_KAISER_BETA)?;
        let py = python_signal_eval(
            &python_bin,
            "periodogram",
            json!({ "x": signal, "fs": fs, "beta": DEFAULT_KAISER_BETA }),
            20,
        )?;
        let candidate_ns = benchmark_avg_ns(20, || {
            kernel
                .run_alloc(signal.as_slice())
                .map(|_| ())
                .map_err(|e| anyhow!("periodogram candidate benchmark failed: {e}"))
        })?;
        let baseline_ns = benchmark_avg_ns(20, || {
            periodogram(&signal, fs, DEFAULT_KAISER_BETA)?;
            Ok(())
        })?;
        record_case(
            &mut rows,
            case_id,
            candidate,
            baseline,
            py,
            candidate_ns,
            baseline_ns,
        )?;
    }

    let versions = python_versions(&python_bin)?;
    let bundle = ContractBundle {
        generated_epoch_seconds: ts,
        python_executable: python_bin.display().to_string(),
        python_version: versions.python_version,
        numpy_version: versions.numpy_version,
        scipy_version: versions.scipy_version.unwrap_or_default(),
        rows,
    };

    let summary_json = out_dir.join("summary.json");
    fs::write(
        &summary_json,
        serde_json::to_vec_pretty(&bundle).context("serializing contract bundle")?,
    )
    .with_context(|| format!("writing {}", summary_json.display()))?;
    write_summary_csv(&out_dir.join("summary.csv"), &bundle.rows)?;

    let worst = bundle
        .rows
        .iter()
        .map(|r| r.max_rel)
        .fold(0.0, f64::max);
    info!(cases = bundle.rows.len(), worst_max_rel = worst, "contracts complete");
    println!("Contract artifacts:");
    println!("  - {}", summary_json.display());
    println!("  - {}", out_dir.join("summary.csv").display());
    println!("  - cases: {}", bundle.rows.len());

    Ok(())
}

fn detect_python_bin() -> PathBuf {
    std::env::var_os("PYTHON")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON_BIN))
}

fn python_versions(python_bin: &Path) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        r#"
import json, sys
import numpy
import scipy
payload = json.loads(sys.stdin.read())
print(json.dumps({
    "output": [],
    "avg_ns": 0.0,
    "python_version": sys.version.split()[0],
    "numpy_version": numpy.__version__,
    "scipy_version": scipy.__version__
}))
"#,
        json!({}),
    )
}

fn python_signal_eval(
    python_bin: &Path,
    op: &str,
    payload: serde_json::Value,
    iters: usize,
) -> Result<PythonEval> {
    run_python_eval(
        python_bin,
        PY_SIGNAL_SCRIPT,
        json!({
            "op": op,
            "iters": iters,
            "payload": payload
        }),
    )
}

fn run_python_eval(
    python_bin: &Path,
    script: &str,
    payload: serde_json::Value,
) -> Result<PythonEval> {
    let mut child = Command::new(python_bin)
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning python interpreter at {}", python_bin.display()))?;

    {
        let stdin = child.stdin.as_mut().context("opening python stdin")?;
        let payload_bytes = serde_json::to_vec(&payload).context("serializing python payload")?;
        stdin
            .write_all(&payload_bytes)
            .context("writing payload to python stdin")?;
    }

    let output = child
        .wait_with_output()
        .context("waiting for python process")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("python execution failed: {stderr}");
    }
    let stdout = String::from_utf8(output.stdout).context("parsing python stdout utf8")?;
    let parsed: PythonEval = serde_json::from_str(stdout.trim()).context("parsing python json")?;
    Ok(parsed)
}

fn record_case(
    rows: &mut Vec<ContractRow>,
    case_id: &str,
    candidate: Vec<f64>,
    baseline: Vec<f64>,
    py: PythonEval,
    candidate_ns: f64,
    baseline_ns: f64,
) -> Result<()> {
    ensure_same_length(case_id, &candidate, &baseline)?;
    ensure_same_length(case_id, &candidate, &py.output)?;

    let row = build_row(RowBuildInput {
        case_id,
        rust_candidate: &candidate,
        python_reference: &py.output,
        rust_candidate_ns: candidate_ns,
        rust_baseline_ns: baseline_ns,
        python_ns: py.avg_ns,
    });
    info!(
        case = case_id,
        pearson_r = row.pearson_r,
        max_rel = row.max_rel,
        "contract case"
    );
    rows.push(row);
    Ok(())
}

fn split_complex(z: &[Complex<f64>]) -> Vec<f64> {
    let mut out = fft::real_parts(z);
    out.extend(fft::imag_parts(z));
    out
}

fn ensure_same_length(case_id: &str, a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        bail!(
            "case {case_id} has mismatched output lengths: left={}, right={}",
            a.len(),
            b.len()
        );
    }
    Ok(())
}

fn benchmark_avg_ns<F>(iters: usize, mut f: F) -> Result<f64>
where
    F: FnMut() -> Result<()>,
{
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_nanos() as f64 / iters as f64)
}

struct RowBuildInput<'a> {
    case_id: &'a str,
    rust_candidate: &'a [f64],
    python_reference: &'a [f64],
    rust_candidate_ns: f64,
    rust_baseline_ns: f64,
    python_ns: f64,
}

fn build_row(args: RowBuildInput<'_>) -> ContractRow {
    let pearson_r = pearson(args.rust_candidate, args.python_reference);
    let mae = mean_abs_error(args.rust_candidate, args.python_reference);
    let rmse = root_mean_squared_error(args.rust_candidate, args.python_reference);
    let max_abs = max_abs_error(args.rust_candidate, args.python_reference);
    let max_rel = max_rel_error(args.rust_candidate, args.python_reference);
    ContractRow {
        case_id: args.case_id.to_string(),
        pearson_r,
        mae,
        rmse,
        max_abs,
        max_rel,
        rust_candidate_ns: args.rust_candidate_ns,
        rust_baseline_ns: args.rust_baseline_ns,
        python_ns: args.python_ns,
        speedup_vs_baseline: args.rust_baseline_ns / args.rust_candidate_ns,
        speedup_vs_python: args.python_ns / args.rust_candidate_ns,
    }
}

fn mean_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .sum::<f64>()
        / a.len() as f64
}

fn root_mean_squared_error(a: &[f64], b: &[f64]) -> f64 {
    (a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f64>()
        / a.len() as f64)
        .sqrt()
}

fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Largest error relative to the reference magnitude, with the scale floored
/// at the largest reference value times machine epsilon so exact zeros in
/// the reference do not dominate.
fn max_rel_error(a: &[f64], b: &[f64]) -> f64 {
    let scale = b.iter().fold(0.0, |acc: f64, v| acc.max(v.abs())) * f64::EPSILON;
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs() / y.abs().max(scale).max(f64::MIN_POSITIVE))
        .fold(0.0, f64::max)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = *x - mean_a;
        let db = *y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / (var_a.sqrt() * var_b.sqrt())
    }
}

fn write_summary_csv(path: &Path, rows: &[ContractRow]) -> Result<()> {
    let mut out = String::new();
    out.push_str("case_id,pearson_r,mae,rmse,max_abs,max_rel,rust_candidate_ns,rust_baseline_ns,python_ns,speedup_vs_baseline,speedup_vs_python\n");
    for row in rows {
        out.push_str(&format!(
            "{},{:.12},{:.12e},{:.12e},{:.12e},{:.12e},{:.3},{:.3},{:.3},{:.6},{:.6}\n",
            row.case_id,
            row.pearson_r,
            row.mae,
            row.rmse,
            row.max_abs,
            row.max_rel,
            row.rust_candidate_ns,
            row.rust_baseline_ns,
            row.python_ns,
            row.speedup_vs_baseline,
            row.speedup_vs_python,
        ));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_lines_follow_the_decimal_pattern() {
        assert_eq!(parse_sample("12"), Some(12.0));
        assert_eq!(parse_sample("-0.25"), Some(-0.25));
        assert_eq!(parse_sample("  3.5 "), Some(3.5));
        assert_eq!(parse_sample(""), None);
        assert_eq!(parse_sample("-"), None);
        assert_eq!(parse_sample("1."), None);
        assert_eq!(parse_sample(".5"), None);
        assert_eq!(parse_sample("+1"), None);
        assert_eq!(parse_sample("1e3"), None);
        assert_eq!(parse_sample("1.2.3"), None);
        assert_eq!(parse_sample("time,value"), None);
        assert_eq!(parse_sample("007"), Some(7.0));
        assert_eq!(parse_sample("--1"), None);
        assert_eq!(parse_sample("-1.-2"), None);
        assert_eq!(parse_sample("1 2"), None);
    }

    #[test]
    fn analyze_arguments() {
        let args = ["rec.txt", "--fs", "2000"].map(String::from);
        let (path, fs) = parse_analyze_args(args.into_iter()).expect("valid args");
        assert_eq!(path, PathBuf::from("rec.txt"));
        assert_eq!(fs, 2000.0);

        let args = ["rec.txt"].map(String::from);
        let (_, fs) = parse_analyze_args(args.into_iter()).expect("valid args");
        assert_eq!(fs, DEFAULT_FS);

        assert!(parse_analyze_args(std::iter::empty()).is_err());
        assert!(parse_analyze_args(["a", "b"].map(String::from).into_iter()).is_err());
        assert!(parse_analyze_args(["a", "--fs"].map(String::from).into_iter()).is_err());
    }

    #[test]
    fn relative_error_stays_finite_on_reference_zeros() {
        let reference = [0.0, 1.0, 100.0];
        let candidate = [0.0, 1.0 + 1e-12, 100.0];
        assert!(max_rel_error(&candidate, &reference) < 1e-10);
        assert!(max_rel_error(&[1e-15], &[0.0]).is_finite());
        assert_eq!(pearson(&reference, &reference), 1.0);
    }
}
