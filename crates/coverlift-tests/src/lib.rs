//! End-to-end tests for the coverlift crates.
//!
//! These drive the worker the way an upload component would: encoded bytes
//! in, a stream of messages out, PNG bytes back.

#[cfg(test)]
mod tests {
    use coverlift_core::PixelBuffer;
    use coverlift_io::{decode, png};
    use coverlift_worker::{
        Algorithm, Dispatcher, Inbound, Mode, Outbound, ProcessingOptions, Worker, WorkerConfig,
    };
    use tempfile::tempdir;

    fn checkerboard(width: u32, height: u32, cell: u32) -> PixelBuffer {
        let mut img = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let on = ((x / cell) + (y / cell)) % 2 == 0;
                let v = if on { 220 } else { 40 };
                img.set_pixel(x, y, [v, v / 2, 255 - v, 255]);
            }
        }
        img
    }

    fn run_sync(file: Vec<u8>, options: ProcessingOptions) -> Vec<Outbound> {
        let dispatcher = Dispatcher::new(WorkerConfig::default());
        let mut msgs = Vec::new();
        dispatcher.handle(Inbound::process_image("e2e", file, options), &mut msgs);
        assert_eq!(dispatcher.ledger().live(), 0);
        msgs
    }

    fn completed(msgs: &[Outbound]) -> PixelBuffer {
        match msgs.last() {
            Some(Outbound::Complete { result, .. }) => decode::decode(result).unwrap(),
            other => panic!("expected COMPLETE, got {other:?}"),
        }
    }

    /// Full path through files on disk: write input, process, write and reload output
    #[test]
    fn test_file_roundtrip_upscale() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cover.png");
        let output = dir.path().join("cover@2x.png");

        let src = checkerboard(50, 50, 5);
        std::fs::write(&input, png::encode(&src, png::Compression::Fast).unwrap()).unwrap();

        let msgs = run_sync(std::fs::read(&input).unwrap(), ProcessingOptions::default());
        let Some(Outbound::Complete { result, .. }) = msgs.last() else {
            panic!("expected COMPLETE, got {msgs:?}");
        };
        std::fs::write(&output, result).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode::probe_dimensions(&bytes).unwrap(), (100, 100));
    }

    #[test]
    fn test_options_from_json_file() {
        let dir = tempdir().unwrap();
        let opts_path = dir.path().join("job.json");
        std::fs::write(
            &opts_path,
            r#"{ "mode": "upscale", "scale": 3, "algorithm": "lanczos",
                 "preProcess": { "denoise": true, "denoiseStrength": 0.5 },
                 "postProcess": { "contrast": true, "vibrance": true } }"#,
        )
        .unwrap();

        let options = ProcessingOptions::from_json_file(&opts_path).unwrap();
        assert_eq!(options.mode, Mode::Upscale);
        let file = png::encode(&checkerboard(10, 8, 2), Default::default()).unwrap();
        let out = completed(&run_sync(file, options));
        assert_eq!(out.dimensions(), (30, 24));
    }

    /// A flat image survives restore untouched for every sharpening method
    #[test]
    fn test_restore_flat_is_identity() {
        let flat = PixelBuffer::filled(40, 30, [77, 150, 210, 255]);
        let file = png::encode(&flat, Default::default()).unwrap();

        for algorithm in [Algorithm::Unsharp, Algorithm::Lanczos, Algorithm::Bicubic] {
            let out = completed(&run_sync(
                file.clone(),
                ProcessingOptions::restore(algorithm, 1.0),
            ));
            assert_eq!(out.dimensions(), (40, 30));
            // Interior for unsharp (blur bias reaches 2px in), whole image for kernels
            for y in 2..28 {
                for x in 2..38 {
                    assert_eq!(out.pixel(x, y), [77, 150, 210, 255], "{algorithm:?} at {x},{y}");
                }
            }
            if algorithm != Algorithm::Unsharp {
                assert_eq!(out, flat);
            }
        }
    }

    #[test]
    fn test_translucent_alpha_preserved_by_restore() {
        let mut src = checkerboard(12, 12, 3);
        for px in src.as_raw_mut().chunks_exact_mut(4) {
            px[3] = 90;
        }
        let file = png::encode(&src, Default::default()).unwrap();
        let out = completed(&run_sync(file, ProcessingOptions::restore(Algorithm::Lanczos, 1.0)));
        assert!(out.pixels().all(|px| px[3] == 90));
    }

    #[test]
    fn test_wire_json_roundtrip_through_dispatcher() {
        let file = png::encode(&checkerboard(8, 8, 2), Default::default()).unwrap();
        let request = serde_json::json!({
            "type": "PROCESS_IMAGE",
            "jobId": "wire-1",
            "payload": { "file": file, "options": { "mode": "restore" } }
        });
        let inbound: Inbound = serde_json::from_value(request).unwrap();

        let dispatcher = Dispatcher::new(WorkerConfig::default());
        let mut msgs = Vec::new();
        dispatcher.handle(inbound, &mut msgs);

        let wire: Vec<serde_json::Value> =
            msgs.iter().map(|m| serde_json::to_value(m).unwrap()).collect();
        let types: Vec<&str> = wire.iter().map(|v| v["type"].as_str().unwrap()).collect();
        assert_eq!(types, ["PROGRESS", "PROGRESS", "PROGRESS", "PROGRESS", "COMPLETE"]);
        let percents: Vec<u64> = wire[..4].iter().map(|v| v["progress"].as_u64().unwrap()).collect();
        assert_eq!(percents, [5, 15, 50, 90]);
        assert!(wire.iter().all(|v| v["jobId"] == "wire-1"));
    }

    #[test]
    fn test_oversized_image_rejected() {
        let file = png::encode(&PixelBuffer::new(4097, 2), png::Compression::Fast).unwrap();
        let msgs = run_sync(file, ProcessingOptions::default());
        assert_eq!(msgs.len(), 2);
        assert!(matches!(msgs[0], Outbound::Progress { progress: 5, .. }));
        match &msgs[1] {
            Outbound::Error { error, .. } => assert!(error.contains("4097x2")),
            other => panic!("expected ERROR, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_worker_many_jobs() {
        let (worker, mut replies) = Worker::spawn(WorkerConfig {
            queue_capacity: 2,
            ..WorkerConfig::default()
        });
        let file = png::encode(&checkerboard(16, 16, 4), Default::default()).unwrap();

        let producer = async {
            for i in 0..6 {
                let options = if i % 2 == 0 {
                    ProcessingOptions::default()
                } else {
                    ProcessingOptions::restore(Algorithm::Bicubic, 0.5)
                };
                worker
                    .submit(Inbound::process_image(format!("job-{i}"), file.clone(), options))
                    .await
                    .unwrap();
            }
        };
        let consumer = async {
            let mut done = Vec::new();
            while done.len() < 6 {
                let msg = replies.recv().await.unwrap();
                if let Outbound::Complete { job_id, result } = msg {
                    done.push((job_id.to_string(), decode::probe_dimensions(&result).unwrap()));
                }
            }
            done
        };
        let ((), done) = tokio::join!(producer, consumer);

        for (i, (id, dims)) in done.iter().enumerate() {
            assert_eq!(id, &format!("job-{i}"));
            let expected = if i % 2 == 0 { (32, 32) } else { (16, 16) };
            assert_eq!(*dims, expected);
        }
        assert_eq!(worker.ledger().live(), 0);
        worker.shutdown().await.unwrap();
    }
}
