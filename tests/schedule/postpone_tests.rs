// tests/schedule/postpone_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::recorder::Recorder;
    use crate::fixtures::test_scheduler::TestScheduler;
    use flux_schedule::{Postpone, ScheduleConfig, ScheduleError, SchedulerError, postpone};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(10);

    #[test]
    fn calls_the_callback_with_the_passed_arguments() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<(i32, i32, i32)>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        postponed.call((1, 2, 3)).unwrap();
        scheduler.advance(10.0);

        assert_eq!(recorder.args(), vec![(1, 2, 3)]);
    }

    #[test]
    fn does_not_call_before_wait_has_elapsed() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<()>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        postponed.call(()).unwrap();
        scheduler.advance(5.0);

        assert_eq!(recorder.count(), 0);
        assert_eq!(postponed.pending(), 1);
    }

    #[test]
    fn calls_once_after_wait_has_elapsed() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<()>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        postponed.call(()).unwrap();
        scheduler.advance(15.0);

        // fired at exactly t0 + wait, and only once
        assert_eq!(recorder.calls(), vec![(10.0, ())]);
        assert_eq!(postponed.pending(), 0);
    }

    #[test]
    fn calls_are_not_coalesced() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<u32>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        postponed.call(1).unwrap();
        scheduler.advance(3.0);
        postponed.call(2).unwrap();
        assert_eq!(postponed.pending(), 2);

        scheduler.advance(20.0);
        assert_eq!(recorder.calls(), vec![(10.0, 1), (13.0, 2)]);
    }

    #[test]
    fn calls_at_the_same_instant_fire_in_call_order() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<u32>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        for n in 0..5 {
            postponed.call(n).unwrap();
        }
        scheduler.advance(10.0);

        assert_eq!(recorder.args(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_wait_fires_on_the_next_turn() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<&'static str>::new();
        let postponed = postpone(
            recorder.callback(&scheduler),
            Duration::ZERO,
            scheduler.clone(),
        );

        postponed.call("now").unwrap();
        assert_eq!(recorder.count(), 0);

        scheduler.advance(0.0);
        assert_eq!(recorder.args(), vec!["now"]);
    }

    #[test]
    fn panicking_callback_does_not_affect_other_invocations() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<u32>::new();
        let record = recorder.callback(&scheduler);
        let postponed = postpone(
            move |n: u32| {
                if n == 0 {
                    panic!("callback failure");
                }
                record(n)
            },
            WAIT,
            scheduler.clone(),
        );

        postponed.call(0).unwrap();
        postponed.call(1).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| scheduler.advance(10.0)));
        assert!(result.is_err());

        // the second timer is still due at t=10
        scheduler.advance(0.0);
        assert_eq!(recorder.args(), vec![1]);
        assert_eq!(postponed.pending(), 0);

        postponed.call(2).unwrap();
        scheduler.advance(10.0);
        assert_eq!(recorder.args(), vec![1, 2]);
    }

    #[test]
    fn scheduler_failure_is_returned_and_nothing_is_pending() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<u32>::new();
        let postponed = postpone(recorder.callback(&scheduler), WAIT, scheduler.clone());

        scheduler.fail_next_call();
        let result = postponed.call(1);
        assert!(matches!(
            result,
            Err(ScheduleError::SchedulerError(SchedulerError::Rejected))
        ));
        assert_eq!(postponed.pending(), 0);
        assert_eq!(scheduler.pending(), 0);

        // recovers on the next call
        postponed.call(2).unwrap();
        scheduler.advance(10.0);
        assert_eq!(recorder.args(), vec![2]);
    }

    #[test]
    fn with_config_uses_the_configured_wait() {
        let scheduler = TestScheduler::new();
        let recorder = Recorder::<()>::new();
        let config = ScheduleConfig::new(25.0).label("autosave");
        let postponed =
            Postpone::with_config(config, scheduler.clone(), recorder.callback(&scheduler))
                .unwrap();
        assert_eq!(postponed.wait(), Duration::from_millis(25));

        postponed.call(()).unwrap();
        scheduler.advance(24.0);
        assert_eq!(recorder.count(), 0);
        scheduler.advance(1.0);
        assert_eq!(recorder.calls(), vec![(25.0, ())]);
    }
}
