use crate::error::SamplerError;
use crate::Sampler;
use chrono::Utc;
use hostmon_common::types::{Category, NetworkSample, Sample};
use sysinfo::Networks;

/// Reports cumulative interface counters since boot, summed over all
/// interfaces. Rates are left to whoever reads the logs.
pub struct NetworkSampler {
    networks: Networks,
}

impl NetworkSampler {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for NetworkSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for NetworkSampler {
    fn category(&self) -> Category {
        Category::Network
    }

    fn sample(&mut self) -> Result<Sample, SamplerError> {
        // Interfaces can appear after startup (container veths in host mode).
        self.networks.refresh_list();
        self.networks.refresh();

        let mut sample = NetworkSample {
            captured_at: Utc::now(),
            bytes_sent: 0,
            bytes_recv: 0,
            packets_sent: 0,
            packets_recv: 0,
            interface_count: 0,
        };

        for (_name, data) in self.networks.iter() {
            sample.bytes_sent = sample.bytes_sent.saturating_add(data.total_transmitted());
            sample.bytes_recv = sample.bytes_recv.saturating_add(data.total_received());
            sample.packets_sent = sample
                .packets_sent
                .saturating_add(data.total_packets_transmitted());
            sample.packets_recv = sample
                .packets_recv
                .saturating_add(data.total_packets_received());
            sample.interface_count += 1;
        }

        if sample.interface_count == 0 {
            return Err(SamplerError::unavailable(
                Category::Network,
                "no network interfaces reported",
            ));
        }

        Ok(Sample::Network(sample))
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_interfaces_missing_at_startup_are_picked_up() {
        let mut sampler = NetworkSampler {
            networks: Networks::new(),
        };
        assert_eq!(sampler.networks.iter().count(), 0);

        let Sample::Network(net) = sampler.sample().expect("loopback should be listed") else {
            panic!("expected a network sample");
        };
        assert!(net.interface_count >= 1);
    }
}
