use clap::Parser;

use aufruf::{Runtime, RuntimeSettings, Signature};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of simulated calls
    #[arg(long, default_value_t = 100_000)]
    calls: usize,

    /// Positional arguments pushed per call
    #[arg(long, default_value_t = 4)]
    args: usize,

    /// Named arguments pushed per call
    #[arg(long, default_value_t = 2)]
    named: usize,

    /// Run a collection every N calls (0 disables)
    #[arg(long, default_value_t = 1024)]
    collect_every: usize,

    /// Maximum number of signatures parked for reuse
    #[arg(long, default_value_t = 32)]
    pool_limit: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut runtime = Runtime::new(RuntimeSettings {
        pool_limit: cli.pool_limit,
        ..Default::default()
    });

    let keys: Vec<_> = (0..cli.named)
        .map(|i| runtime.strings.intern(&format!("kw{i}")))
        .collect();

    let mut checksum: i64 = 0;
    for call in 0..cli.calls {
        let mut sig = runtime.pool.take();
        build_call(&mut runtime, &mut sig, call as i64, cli.args, &keys);
        checksum = checksum.wrapping_add(consume_call(&mut runtime, &sig, &keys));

        if cli.collect_every != 0 && (call + 1) % cli.collect_every == 0 {
            runtime.collect(&[&sig]);
        }
        runtime.pool.recycle(sig);
    }
    let stats = runtime.collect(&[]);

    println!("calls:       {}", cli.calls);
    println!("checksum:    {checksum}");
    println!("collections: {}", runtime.collections());
    println!("parked:      {}", runtime.pool.parked_count());
    println!(
        "final heap:  {} strings, {} objects live",
        stats.strings_live, stats.objects_live
    );
}

/// Fill a signature the way a caller would, cycling through the four
/// kinds.
fn build_call(runtime: &mut Runtime, sig: &mut Signature, seed: i64, args: usize, keys: &[aufruf::StrHandle]) {
    for i in 0..args {
        let value = seed.wrapping_add(i as i64);
        match i % 4 {
            0 => sig.push_int(value),
            1 => sig.push_float(value as f64 + 0.5),
            2 => {
                let text = runtime.strings.from_int(value);
                sig.push_str(text);
            }
            _ => {
                let boxed = runtime.objects.box_int(value);
                sig.push_obj(boxed);
            }
        }
    }
    for (i, &key) in keys.iter().enumerate() {
        sig.push_int_named(key, seed.wrapping_mul(i as i64 + 1));
    }
}

/// Read every argument back as an integer, the way a callee with integer
/// formals would.
fn consume_call(runtime: &mut Runtime, sig: &Signature, keys: &[aufruf::StrHandle]) -> i64 {
    let mut sum: i64 = 0;
    for index in 0..sig.num_positionals() {
        sum = sum.wrapping_add(sig.get_int(runtime, index));
    }
    for &key in keys {
        sum = sum.wrapping_add(sig.get_int_named(runtime, key));
    }
    sum
}
