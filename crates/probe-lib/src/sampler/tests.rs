//! Sampler tests
//!
//! Scripted probers exercise ordering and failure handling; the TCP prober
//! is tested against a listener on the loopback interface.

#[cfg(test)]
mod scripted_prober_tests {
    use crate::models::{SampleOutcome, Target};
    use crate::sampler::{async_trait, ConnectError, Prober, Sampler, SamplerConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Prober returning a fixed script of results, then failures
    struct ScriptedProber {
        script: Mutex<Vec<Option<f64>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProber {
        fn new(script: Vec<Option<f64>>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, _target: &Target, timeout: Duration) -> Result<Duration, ConnectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop().flatten() {
                Some(ms) => Ok(Duration::from_secs_f64(ms / 1000.0)),
                None => Err(ConnectError::Timeout(timeout)),
            }
        }
    }

    fn config(count: u32) -> SamplerConfig {
        SamplerConfig {
            count,
            interval: Duration::ZERO,
            connect_timeout: Duration::from_millis(100),
        }
    }

    fn target() -> Target {
        Target::new("local", "127.0.0.1", 8443)
    }

    #[tokio::test]
    async fn test_run_yields_exactly_count_samples_in_order() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(5.0); 12]));
        let sampler = Sampler::new(prober.clone(), config(12));
        let target = target();

        let samples = sampler.run(&target).collect().await;

        assert_eq!(samples.len(), 12);
        let indices: Vec<u32> = samples.iter().map(|s| s.index).collect();
        assert_eq!(indices, (1..=12).collect::<Vec<u32>>());
        assert!(samples.iter().all(|s| s.target_name == "local" && s.port == 8443));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_failures_become_failed_samples() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(3.5), None, Some(4.25), None]));
        let sampler = Sampler::new(prober, config(4));
        let target = target();

        let samples = sampler.run(&target).collect().await;

        assert_eq!(samples.len(), 4);
        assert!(matches!(samples[0].outcome, SampleOutcome::Success { .. }));
        assert_eq!(samples[1].outcome, SampleOutcome::Failed);
        assert!((samples[2].latency_ms().unwrap() - 4.25).abs() < 1e-6);
        assert_eq!(samples[3].outcome, SampleOutcome::Failed);
    }

    #[tokio::test]
    async fn test_exhausted_run_stays_exhausted() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(1.0), Some(1.0)]));
        let sampler = Sampler::new(prober.clone(), config(2));
        let target = target();

        let mut run = sampler.run(&target);
        assert_eq!(run.remaining(), 2);
        assert!(run.next().await.is_some());
        assert!(run.next().await.is_some());
        assert_eq!(run.remaining(), 0);
        assert!(run.next().await.is_none());
        assert!(run.next().await.is_none());

        assert_eq!(prober.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_new_run_probes_again() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(1.0), Some(2.0)]));
        let sampler = Sampler::new(prober.clone(), config(1));
        let target = target();

        let first = sampler.run(&target).collect().await;
        let second = sampler.run(&target).collect().await;

        assert_eq!(first[0].index, 1);
        assert_eq!(second[0].index, 1);
        assert_ne!(first[0].latency_ms(), second[0].latency_ms());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_is_lazy() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(1.0)]));
        let sampler = Sampler::new(prober.clone(), config(5));
        let target = target();

        let _run = sampler.run(&target);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_interval_separates_attempts() {
        let prober = Arc::new(ScriptedProber::new(vec![Some(1.0); 3]));
        let sampler = Sampler::new(
            prober,
            SamplerConfig {
                count: 3,
                interval: Duration::from_millis(20),
                connect_timeout: Duration::from_millis(100),
            },
        );
        let target = target();

        let start = tokio::time::Instant::now();
        let samples = sampler.run(&target).collect().await;

        assert_eq!(samples.len(), 3);
        // Two pauses between three attempts, no trailing wait required
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_sampler_config_default() {
        let config = SamplerConfig::default();
        assert_eq!(config.count, 12);
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }
}

#[cfg(test)]
mod tcp_prober_tests {
    use crate::models::Target;
    use crate::sampler::{ConnectError, Prober, TcpConnectProber};
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_to_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let target = Target::new("loopback", "127.0.0.1", port);

        let elapsed = TcpConnectProber::new()
            .probe(&target, Duration::from_secs(2))
            .await
            .unwrap();

        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = Target::new("closed", "127.0.0.1", port);
        let result = TcpConnectProber::new()
            .probe(&target, Duration::from_secs(2))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails() {
        let target = Target::new("nowhere", "host.invalid", 443);
        let result = TcpConnectProber::new()
            .probe(&target, Duration::from_secs(2))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_io_error_classification() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(ConnectError::from(refused).kind(), "refused");

        let other = std::io::Error::from(std::io::ErrorKind::AddrNotAvailable);
        assert_eq!(ConnectError::from(other).kind(), "io");

        let os_timeout = std::io::Error::from(std::io::ErrorKind::TimedOut);
        let err = ConnectError::from(os_timeout);
        assert_eq!(err.kind(), "io");
        assert!(!err.to_string().contains("0ns"));

        assert_eq!(ConnectError::Timeout(Duration::from_secs(2)).kind(), "timeout");
    }
}
