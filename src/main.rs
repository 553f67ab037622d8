mod converge;
mod propagate;
mod reduce;
mod summarize;

use bpaf::Bpaf;

/// Uncertain doubles: running samples with error propagation
#[derive(Bpaf)]
#[bpaf(options)]
enum Subcommand {
    /// Read CSV on stdin and print the mean and standard error of each column
    #[bpaf(command)]
    Summarize(#[bpaf(external(summarize::options))] summarize::Options),
    /// Compare propagated errors with directly measured ones
    #[bpaf(command)]
    Propagate(#[bpaf(external(propagate::options))] propagate::Options),
    /// Watch the standard error shrink as uniform samples come in
    #[bpaf(command)]
    Converge(#[bpaf(external(converge::options))] converge::Options),
    /// Reduce one value per worker thread into a single sample
    #[bpaf(command)]
    Reduce(#[bpaf(external(reduce::options))] reduce::Options),
}

fn main() {
    env_logger::init();
    let result = match subcommand().run() {
        Subcommand::Summarize(opts) => summarize::summarize(opts),
        Subcommand::Propagate(opts) => propagate::propagate(opts),
        Subcommand::Converge(opts) => converge::converge(opts),
        Subcommand::Reduce(opts) => reduce::reduce(opts),
    };
    match result {
        Ok(()) => (),
        Err(e) => {
            // Ignore EPIPE
            if let Some(e) = e.downcast_ref::<std::io::Error>() {
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    return;
                }
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(1)
        }
    }
}
