//! The prelude alone is enough to declare, wire and build an assembly.

use montage::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

trait Temperature {
    fn celsius(&self) -> f64;
}

struct Sensor {
    reading: f64,
}

impl Temperature for Sensor {
    fn celsius(&self) -> f64 {
        self.reading
    }
}

impl Component for Sensor {
    fn declare_ports(&self, ports: &mut Ports<Self>) {
        ports
            .field("reading", |s: &mut Self| &mut s.reading)
            .interface::<dyn Temperature>(|c| c as Rc<RefCell<dyn Temperature>>);
    }

    fn debug(&self) -> String {
        format!("Sensor({:.1})", self.reading)
    }
}

#[derive(Default)]
struct Thermostat {
    sensors: Vec<Handle<dyn Temperature>>,
}

impl Thermostat {
    fn average(&self) -> Result<f64, PortError> {
        let mut total = 0.0;
        for sensor in &self.sensors {
            total += sensor.with(|s| s.celsius())?;
        }
        Ok(total / self.sensors.len() as f64)
    }
}

impl Component for Thermostat {
    fn declare_ports(&self, ports: &mut Ports<Self>) {
        ports.setter("sensor", |t: &mut Self, s: Handle<dyn Temperature>| {
            t.sensors.push(s)
        });
    }
}

#[test]
fn thermostat_reads_every_room() {
    let mut model = Model::new();
    model.composite_with("rooms", Array::new(2, || Sensor { reading: 18.0 }));
    model.component("thermostat", Thermostat::default);
    model.connect::<MultiUse<dyn Temperature>>((
        PortAddress::new("sensor", "thermostat"),
        "rooms".into(),
    ));
    model.connect::<Set<f64>>((PortAddress::new("reading", addr!("rooms", 1)), 22.0));

    let assembly = Assembly::new(&model).unwrap();
    let thermostat = assembly.at::<Thermostat>(&addr!("thermostat")).unwrap();
    assert_eq!(thermostat.average().unwrap(), 20.0);

    let mut out = Vec::new();
    assembly
        .composite(&addr!("rooms"))
        .unwrap()
        .print_all(&mut out)
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "rooms_0: Sensor(18.0)\nrooms_1: Sensor(22.0)\n"
    );
}

#[test]
fn errors_surface_through_the_prelude() {
    let mut model = Model::new();
    model.component("thermostat", Thermostat::default);
    model.connect::<Use<dyn Temperature>>((
        PortAddress::new("sensor", "thermostat"),
        "missing".into(),
    ));
    let err: AssemblyError = Assembly::new(&model).unwrap_err();
    assert_eq!(err.code(), "ADDRESS_NOT_FOUND");
}
