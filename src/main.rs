use fifo_pool::WorkerPool;
use futures::future;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;
use tokio::runtime::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// American wheel: pockets 0..=36 plus 00, kept as 37.
const DOUBLE_ZERO: u8 = 37;

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    fn flip(self) -> Self {
        match self {
            Color::Black => Color::Red,
            _ => Color::Black,
        }
    }
}

fn color_of(pocket: u8) -> Color {
    if pocket == 0 || pocket == DOUBLE_ZERO {
        Color::Green
    } else if RED_NUMBERS.contains(&pocket) {
        Color::Red
    } else {
        Color::Black
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayMode {
    /// Keep spinning until the bankroll is gone or the spin cap is hit.
    UntilBroke,
    /// Walk away on the first win that recovers from a capped bet.
    StopAfterCapWin,
}

/// Everything one session needs, owned by value so sessions can run
/// concurrently without sharing anything.
#[derive(Debug, Clone)]
struct SimSettings {
    bankroll: f64,
    base_bet: f64,
    max_bet: f64,
    loss_threshold: u32,
    /// Bet multiplier per consecutive loss; the last entry repeats.
    multipliers: Vec<f64>,
    /// Also stake $1 per spin on the 0-00 split, paying 17:1.
    extra_bet: bool,
    mode: PlayMode,
    spin_cap: u32,
    seed: u64,
}

/// One complete martingale session on an American wheel. Even-money color
/// bets starting on black; on a loss the stake grows by the multiplier
/// sequence up to `max_bet`; after `loss_threshold` straight losses the
/// color flips and the stake resets. Returns the final bankroll.
fn simulate_session(settings: SimSettings) -> f64 {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut bankroll = settings.bankroll;
    let mut bet = settings.base_bet;
    let mut bet_color = Color::Black;
    let mut consecutive_losses: u32 = 0;
    let mut capped = false;

    for _ in 0..settings.spin_cap {
        if bankroll <= 0.0 {
            break;
        }
        let pocket = rng.gen_range(0..=DOUBLE_ZERO);
        let color = color_of(pocket);

        if settings.extra_bet {
            if color == Color::Green {
                bankroll += 17.0;
            } else {
                bankroll -= 1.0;
            }
        }

        if color == bet_color {
            bankroll += bet;
            let recovered_from_cap = capped;
            bet = settings.base_bet;
            consecutive_losses = 0;
            capped = false;
            if settings.mode == PlayMode::StopAfterCapWin && recovered_from_cap {
                break;
            }
        } else {
            bankroll -= bet;
            consecutive_losses += 1;
            if consecutive_losses >= settings.loss_threshold {
                bet_color = bet_color.flip();
                bet = settings.base_bet;
                consecutive_losses = 0;
                capped = false;
            } else {
                let step =
                    (consecutive_losses as usize - 1).min(settings.multipliers.len() - 1);
                let mut next = bet * settings.multipliers[step];
                if next > settings.max_bet {
                    next = settings.max_bet;
                    capped = true;
                }
                bet = next;
            }
        }
    }

    bankroll
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fifo_pool=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rt = Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .unwrap();

    rt.block_on(async {
        let now = Instant::now();
        let pool = WorkerPool::new(num_cpus::get());

        let settings = SimSettings {
            bankroll: 100.0,
            base_bet: 1.0,
            max_bet: 200.0,
            loss_threshold: 6,
            multipliers: vec![3.0, 3.0, 3.0, 2.0],
            extra_bet: false,
            mode: PlayMode::UntilBroke,
            spin_cap: 10_000,
            seed: 0x5EED,
        };

        const SESSIONS: u64 = 10_000;
        let mut handles = Vec::with_capacity(SESSIONS as usize);
        for run in 0..SESSIONS {
            let mut session = settings.clone();
            session.seed = settings.seed.wrapping_add(run);
            let handle = pool
                .submit(move || simulate_session(session))
                .expect("pool accepts work until shutdown");
            handles.push(handle);
        }

        let results = future::join_all(handles).await;

        let mut total = 0.0;
        let mut busted = 0usize;
        let mut ahead = 0usize;
        for result in &results {
            match result {
                Ok(final_bankroll) => {
                    total += final_bankroll;
                    if *final_bankroll <= 0.0 {
                        busted += 1;
                    } else if *final_bankroll > settings.bankroll {
                        ahead += 1;
                    }
                }
                Err(err) => eprintln!("session failed: {err}"),
            }
        }

        println!("sessions:            {SESSIONS}");
        println!("mean final bankroll: ${:.2}", total / results.len() as f64);
        println!("busted:              {busted}");
        println!("finished ahead:      {ahead}");
        println!("tasks completed:     {}", pool.metrics().completed_tasks);

        pool.shutdown().await;
        println!("elapsed: {:?}", now.elapsed());
    });
}
