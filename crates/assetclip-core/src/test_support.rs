use crate::hash::{ContentHasher, HashError};
use crate::value::Value;
use crate::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

/// Hasher with a fixed reference -> digest table. Unknown references fail.
#[derive(Default)]
pub struct FakeHasher {
    digests: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakeHasher {
    pub fn new(digests: &[(&str, &str)]) -> Self {
        Self {
            digests: digests
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentHasher for FakeHasher {
    fn digest<'a>(&'a self, resource: &'a Value) -> BoxFuture<'a, Result<String, HashError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = resource
            .as_str()
            .and_then(|r| self.digests.get(r).cloned())
            .ok_or_else(|| HashError::Unresolvable(format!("{:?}", resource)));
        Box::pin(async move { result })
    }
}
