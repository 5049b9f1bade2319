use tally_core::{Deferred, Outcome};

fn main() {
    let deferred = Deferred::defer();
    deferred
        .chain(|| {})
        .chain_with_control(|d| d.reject())
        .chain(|| unreachable!())
        .on_failure_then(|| {})
        .on_complete_then(|| unreachable!());

    let callback = deferred.resolve().into_callback();
    callback();
    assert_eq!(deferred.outcome(), Some(Outcome::Rejected { ran: 2 }));
}
