//! Common source code fixtures for tests.

pub const SCENARIO_A: &str = "part def Engine; part def Car { part e : Engine; }";

pub const NESTED_PACKAGE: &str = "package Vehicles {
    part def Vehicle;
    part def Car;
}
";

pub const VEHICLE: &str = "package Vehicle {
    part def Engine { port fuelIn; }
    part def Car {
        part engine : Engine;
        part tank;
        connection fuel connect tank to engine;
        satisfy SpeedReq;
    }
    requirement SpeedReq;
    state def Modes { state idle; state run; transition go first idle then run; }
}
";

pub const REQUIREMENTS: &str = "package Reqs {
    requirement def R;
    requirement r : R;
    verification def V;
    part p { satisfy r; }
}
";

pub const FEATURE_CHAINS: &str = "part def Engine { port fuelIn; }
part def Tank { port out; }
part def Car {
    part engine : Engine;
    part tank : Tank;
    connect tank.out to engine.fuelIn;
}
";

pub const TAB_INDENTED: &str = "package P {\n\tpart def Foo;\n\tpart def Bar;\n\tpart def Baz;\n}\n";
